//! Kont CLI library — command-line definition and command implementations
//! shared by the `kont` binary and its integration tests.

pub mod cli;
pub mod commands;

//! Interactive JSON-RPC client.
//!
//! - [`client::RpcClient`] — single request/response calls.
//! - [`engine::KontEngine`] — interactive calls with server-initiated callbacks.
//! - [`registry`] — splits caller bindings into data and callbacks.
//! - [`transport`] — the exchange primitive both build on.

pub mod client;
pub mod engine;
pub mod registry;
pub mod transport;
pub mod types;

pub use client::RpcClient;
pub use engine::KontEngine;
pub use registry::{Binding, Bindings, Callback, CallbackResult, CallbackTable};
pub use transport::{HttpTransport, Transport};
pub use types::{CallDescriptor, KontReply, KontRequest, ServerMessage, KONT_PATH};

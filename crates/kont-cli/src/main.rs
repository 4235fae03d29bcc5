//! Kont CLI — simple and interactive calls against a kont server.
//!
//! Thin front end over `kont_core::Client`; everything protocol-related lives
//! in kont-core.

use clap::Parser;

use kont_cli::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kont_core=warn,kont_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

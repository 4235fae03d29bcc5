//! Command-line definition for `kont`.
//!
//! Connection flags fall back to the same `KONT_*` variables, with the same
//! meaning, that `ClientConfig::from_env` reads.

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

use kont_core::config::{
    DEFAULT_API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ENV_API_KEY,
    ENV_API_KEY_HEADER, ENV_BASE_URL, ENV_INSECURE, ENV_KONT_PATH, ENV_TIMEOUT_SECS,
};
use kont_core::rpc::KONT_PATH;

use crate::commands::{self, invoke::InvokeArgs, ConnectionArgs};

/// Kont CLI — interactive JSON-RPC client
#[derive(Parser, Debug)]
#[command(name = "kont", version, about = "Kont CLI — interactive JSON-RPC client")]
pub struct Cli {
    /// Server base URL
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// API key sent with every request
    #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Header carrying the API key
    #[arg(long, env = ENV_API_KEY_HEADER, default_value = DEFAULT_API_KEY_HEADER)]
    pub api_key_header: String,

    /// Accept invalid TLS certificates (self-signed dev servers)
    #[arg(long, env = ENV_INSECURE, value_parser = BoolishValueParser::new())]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = ENV_TIMEOUT_SECS, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Endpoint receiving continuation replies
    #[arg(long, env = ENV_KONT_PATH, default_value = KONT_PATH)]
    pub kont_path: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single request and print the response
    Call {
        /// Method path (e.g. "balance" or "/balance")
        #[arg(long)]
        method: String,
        /// Request payload as a JSON string
        #[arg(long, default_value = "[]")]
        args: String,
    },

    /// Run an interactive call, answering server callbacks
    Invoke {
        /// Method path (e.g. "rps/play")
        #[arg(long)]
        method: String,
        /// Positional arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,
        /// Plain value bindings as a JSON object
        #[arg(long)]
        values: Option<String>,
        /// Callback with a fixed answer: NAME=JSON (repeatable)
        #[arg(long = "answer", value_name = "NAME=JSON")]
        answers: Vec<String>,
        /// Callback answered interactively at the terminal (repeatable)
        #[arg(long = "ask", value_name = "NAME")]
        asks: Vec<String>,
    },
}

impl Cli {
    pub fn connection_args(&self) -> ConnectionArgs {
        ConnectionArgs {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            api_key_header: self.api_key_header.clone(),
            insecure: self.insecure,
            timeout_secs: self.timeout_secs,
            kont_path: self.kont_path.clone(),
        }
    }
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<(), String> {
    let conn = cli.connection_args();

    match cli.command {
        Some(Commands::Call { method, args }) => commands::call::run(&conn, &method, &args).await,
        Some(Commands::Invoke {
            method,
            args,
            values,
            answers,
            asks,
        }) => {
            commands::invoke::run(
                &conn,
                InvokeArgs {
                    method: &method,
                    args: &args,
                    values: values.as_deref(),
                    answers: &answers,
                    asks: &asks,
                },
            )
            .await
        }
        None => {
            // No subcommand — show help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}

//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and goes through
//! `kont_core::Client`, the same entry point library users get.

pub mod call;
pub mod invoke;

use std::time::Duration;

use kont_core::{Client, ClientConfig};
use serde_json::Value;

/// Connection settings collected from global flags / environment.
#[derive(Debug, Clone)]
pub struct ConnectionArgs {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub insecure: bool,
    pub timeout_secs: u64,
    pub kont_path: String,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone())
            .with_insecure(self.insecure)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_kont_path(self.kont_path.clone());
        config.api_key = self.api_key.clone().filter(|k| !k.is_empty());
        config.api_key_header = self.api_key_header.clone();
        config
    }
}

/// Build an HTTP client or fail with a printable message.
pub fn connect(conn: &ConnectionArgs) -> Result<Client, String> {
    Client::connect(conn.to_config()).map_err(|e| format!("Failed to create client: {}", e))
}

/// Parse a JSON command-line argument, naming the flag on failure.
pub fn parse_json_arg(flag: &str, raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON for --{}: {}", flag, e))
}

/// Parse `--args`, which must be a JSON array.
pub fn parse_positional_args(raw: &str) -> Result<Vec<Value>, String> {
    match parse_json_arg("args", raw)? {
        Value::Array(items) => Ok(items),
        other => Err(format!("--args must be a JSON array, got {}", other)),
    }
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

//! Client configuration.
//!
//! Mirrors the knobs the HTTP transport needs: where the server lives, how to
//! authenticate, whether to relax TLS verification, and where continuations go.

use std::time::Duration;

use crate::rpc::types::KONT_PATH;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

// Environment variables read by `ClientConfig::from_env` and the `kont` CLI.
pub const ENV_BASE_URL: &str = "KONT_BASE_URL";
pub const ENV_API_KEY: &str = "KONT_API_KEY";
pub const ENV_API_KEY_HEADER: &str = "KONT_API_KEY_HEADER";
pub const ENV_INSECURE: &str = "KONT_INSECURE";
pub const ENV_TIMEOUT_SECS: &str = "KONT_TIMEOUT_SECS";
pub const ENV_KONT_PATH: &str = "KONT_PATH";

/// Parse a boolean switch. Accepts `y`/`yes`/`t`/`true`/`on`/`1` and
/// `n`/`no`/`f`/`false`/`off`/`0`, case-insensitively (the set clap's
/// `BoolishValueParser` accepts).
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, without trailing slash.
    pub base_url: String,
    /// API key sent on every request when set.
    pub api_key: Option<String>,
    /// Header carrying `api_key`.
    pub api_key_header: String,
    /// Accept invalid TLS certificates (self-signed dev servers).
    pub insecure: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Endpoint receiving `[kid, answer]` continuation requests.
    pub kont_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            insecure: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            kont_path: KONT_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build a config from `KONT_*` environment variables, falling back to defaults.
    ///
    /// - `KONT_BASE_URL`
    /// - `KONT_API_KEY`
    /// - `KONT_API_KEY_HEADER`
    /// - `KONT_INSECURE` (see [`parse_flag`]; unparseable values leave it off)
    /// - `KONT_TIMEOUT_SECS`
    /// - `KONT_PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.is_empty());
        if let Some(header) = lookup(ENV_API_KEY_HEADER) {
            config.api_key_header = header;
        }
        if let Some(flag) = lookup(ENV_INSECURE) {
            config.insecure = parse_flag(&flag).unwrap_or(false);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup(ENV_KONT_PATH).filter(|p| !p.trim().is_empty()) {
            config.kont_path = path;
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_kont_path(mut self, kont_path: impl Into<String>) -> Self {
        self.kont_path = kont_path.into();
        self
    }

    /// Join the base URL with an already-normalized path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

//! Kont Core — client for interactive JSON-RPC with server-initiated callbacks.
//!
//! An interactive call can suspend on the server, which then asks the client
//! to run one of the functions it registered for that call. The client answers
//! under a correlation id and the server resumes, until a final answer arrives.
//!
//! The engine is generic over [`rpc::Transport`], so it can run over:
//!
//! - HTTP (via [`rpc::HttpTransport`], the default)
//! - any in-process or test channel implementing `Transport`
//!
//! # Example
//!
//! ```ignore
//! use kont_core::{Client, ClientConfig, Bindings, Callback};
//! use serde_json::json;
//!
//! let client = Client::connect(ClientConfig::from_env())?;
//! let answer = client
//!     .invoke_interactive(
//!         "rps/play",
//!         vec![json!("alice")],
//!         Bindings::new().callback("getHand", Callback::sync(|_| Ok(json!(1)))),
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod rpc;

use serde_json::Value;

// Convenience re-exports
pub use config::ClientConfig;
pub use error::{ClientError, FaultSide, TransportError};
pub use rpc::{Binding, Bindings, Callback, HttpTransport, KontEngine, RpcClient, Transport};

/// Simple and interactive calls over one shared transport.
pub struct Client<T = HttpTransport> {
    engine: KontEngine<T>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl Client<HttpTransport> {
    /// Build an HTTP-backed client from `config`.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let kont_path = config.kont_path.clone();
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            engine: KontEngine::new(RpcClient::new(transport)).with_kont_path(kont_path),
        })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            engine: KontEngine::new(RpcClient::new(transport)),
        }
    }

    pub fn with_kont_path(self, kont_path: impl Into<String>) -> Self {
        Self {
            engine: self.engine.with_kont_path(kont_path),
        }
    }

    /// Single request/response call.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.engine.rpc().call(method, params).await
    }

    /// Interactive call; see [`KontEngine::invoke_interactive`].
    pub async fn invoke_interactive(
        &self,
        method: &str,
        positional_args: Vec<Value>,
        bindings: Bindings,
    ) -> Result<Value, ClientError> {
        self.engine
            .invoke_interactive(method, positional_args, bindings)
            .await
    }

    pub fn transport(&self) -> &T {
        self.engine.rpc().transport()
    }
}

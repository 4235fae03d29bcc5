//! Error types for the kont client.
//!
//! `TransportError` is what a `Transport` implementation raises; it is carried
//! through untouched. `ClientError` is what callers of `RpcClient::call` and
//! `KontEngine::invoke_interactive` see.

/// Failure of a single request/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response JSON: {0}")]
    Decode(String),
}

/// Which side of an interactive call misbehaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSide {
    /// Transport failure or a server that broke the protocol.
    Server,
    /// A registered callback returned an error.
    Callback,
    /// The caller passed something unusable.
    Caller,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Unknown callback: {0}")]
    UnknownCallback(String),

    #[error("Callback '{name}' failed: {message}")]
    Callback { name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    pub fn side(&self) -> FaultSide {
        match self {
            ClientError::Transport(_)
            | ClientError::Protocol(_)
            | ClientError::UnknownCallback(_) => FaultSide::Server,
            ClientError::Callback { .. } => FaultSide::Callback,
            ClientError::InvalidArgument(_) => FaultSide::Caller,
        }
    }
}

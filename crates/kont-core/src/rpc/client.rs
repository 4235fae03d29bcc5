//! Simple RPC: one request, one response, payload passed through untouched.

use std::sync::Arc;

use serde_json::Value;

use super::transport::Transport;
use super::types::normalize_method;
use crate::error::ClientError;

/// Single-shot JSON calls over a shared transport.
///
/// Cloning is cheap; clones share the transport, so independent calls can run
/// concurrently when the transport allows it.
pub struct RpcClient<T> {
    transport: Arc<T>,
}

impl<T> Clone for RpcClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// POST `params` to `method` and return whatever the server answered.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let path = normalize_method(method)?;
        let result = self.transport.post(&path, params).await;
        if let Err(e) = &result {
            tracing::warn!("[RpcClient] {} failed: {}", path, e);
        }
        Ok(result?)
    }
}

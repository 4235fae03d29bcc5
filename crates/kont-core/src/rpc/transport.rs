//! Request/response channel used by `RpcClient`.
//!
//! The engine only needs one primitive: post a JSON body to a path and get a
//! JSON value back. `HttpTransport` is the reqwest-backed implementation; tests
//! plug in their own.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::TransportError;

pub trait Transport: Send + Sync {
    /// Perform one exchange. `path` is already normalized (leading `/`).
    fn post(
        &self,
        path: &str,
        body: Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn post(
        &self,
        path: &str,
        body: Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).post(path, body)
    }
}

/// JSON over HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        if config.insecure {
            tracing::warn!(
                "[HttpTransport] TLS certificate verification disabled for {}",
                config.base_url
            );
        }

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        let url = self.config.url_for(path);
        tracing::debug!("[HttpTransport] POST {}", url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header(self.config.api_key_header.as_str(), key.as_str());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("POST {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => format!("<failed to read response body: {}>", e),
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

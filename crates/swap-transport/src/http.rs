//! JSON-RPC 2.0 transport for the swap service.
//!
//! Every call is a single POST of
//! `{"jsonrpc":"2.0","id":<n>,"method":<name>,"params":[...]}` to the
//! configured endpoint. Binary arguments are 0x-hex strings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use swap_types::{Result, SwapError};
use tracing::{debug, warn};

use crate::{Transport, TransportArg};

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9933".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [TransportArg],
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// HTTP client speaking JSON-RPC to the swap endpoint.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::Transport(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Output = serde_json::Value;

    async fn send(&self, method: &str, args: Vec<TransportArg>) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &args,
        };
        debug!(id, method, params = args.len(), "sending rpc request");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(id, method, error = %e, "rpc request failed");
                SwapError::Transport(format!("rpc request failed: {}", e))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(id, method, %status, "rpc endpoint returned an error status");
            return Err(SwapError::Transport(format!(
                "endpoint returned status {}: {}",
                status, body
            )));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| SwapError::Transport(format!("failed to parse rpc response: {}", e)))?;

        if let Some(err) = body.error {
            return Err(SwapError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(body.result.unwrap_or(serde_json::Value::Null))
    }
}

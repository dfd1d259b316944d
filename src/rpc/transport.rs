//! HTTP transport for JSON-RPC requests
//!
//! The client only needs "POST this JSON, give me the JSON back", so the
//! transport sits behind a trait and tests swap in a scripted one.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{Error, Result};

/// Per-request timeout for RPC calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one JSON-RPC request body and returns the decoded response body
#[async_trait]
pub trait Transport: Send + Sync {
    /// `method` is only used to label errors
    async fn post(&self, method: &str, body: Value) -> Result<Value>;
}

/// `reqwest` based transport posting to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, method: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::rpc_transport(method, e))?;

        // JSON-RPC errors may arrive with a non-2xx status; the body decides
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::rpc_transport(method, e))?;

        serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                Error::rpc_decode(method, e)
            } else {
                Error::rpc_transport(method, format!("HTTP {status}: {}", text.trim()))
            }
        })
    }
}

//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! - One pooled `reqwest::Client` per transport, safe to share across tasks
//! - Bounded retry with exponential backoff for transport-level failures only
//! - Error envelopes are returned as delivered, whatever the HTTP status

use async_trait::async_trait;
use std::time::Duration;

use chainclient_core::error::TransportError;
use chainclient_core::policy::{RetryConfig, RetryPolicy};
use chainclient_core::request::{JsonRpcRequest, JsonRpcResponse};
use chainclient_core::transport::RpcTransport;

/// Longest response body kept in a `TransportError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    /// HTTP basic credentials, as bitcoind-style nodes require.
    pub basic_auth: Option<(String, String)>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
            basic_auth: None,
        }
    }
}

/// HTTP JSON-RPC client with bounded retry.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
    basic_auth: Option<(String, String)>,
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("url", &self.url)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl HttpRpcClient {
    /// Create a client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let url = url.into();
        reqwest::Url::parse(&url)
            .map_err(|e| TransportError::Config(format!("invalid endpoint url '{url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Config(format!("building http client: {e}")))?;

        Ok(Self {
            url,
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
            basic_auth: config.basic_auth,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let mut builder = self.http.post(&self.url).json(req);
        if let Some((user, pass)) = &self.basic_auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let resp = builder.send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(TransportError::Deserialization);
        }

        // Some nodes (bitcoind) report application errors with HTTP 500 and a
        // full envelope. That envelope was delivered; it is not a transport failure.
        if let Ok(envelope) = serde_json::from_slice::<JsonRpcResponse>(&body) {
            if envelope.error.is_some() {
                return Ok(envelope);
            }
        }

        let text = String::from_utf8_lossy(&body);
        Err(TransportError::Status {
            status: status.as_u16(),
            body: text.chars().take(MAX_ERROR_BODY).collect(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            method = %req.method,
                            url = %self.url,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            method = %req.method,
                            url = %self.url,
                            "max attempts exceeded"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

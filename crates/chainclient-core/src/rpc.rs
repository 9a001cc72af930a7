//! Typed JSON-RPC calls over any [`RpcTransport`].
//!
//! [`RpcClient`] turns the three possible outcomes of a delivered request
//! into distinct errors: a transport failure ([`ClientError::Transport`]),
//! an error envelope ([`ClientError::Rpc`], returned unmodified and never
//! retried) and an envelope whose result is null or absent
//! ([`ClientError::EmptyResult`]).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::Context;
use crate::error::ClientError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// Shared, cheaply clonable JSON-RPC caller bound to one endpoint.
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.transport.url())
            .finish()
    }
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    /// Send `method` and return the delivered envelope as-is.
    pub async fn call_raw(
        &self,
        ctx: &Context,
        method: &str,
        params: Vec<Value>,
    ) -> Result<JsonRpcResponse, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = JsonRpcRequest::new(id, method, params);
        tracing::debug!(method, id, url = %self.transport.url(), "dispatching rpc request");
        ctx.run(async {
            self.transport
                .send(req)
                .await
                .map_err(|source| ClientError::Transport {
                    method: method.to_string(),
                    source,
                })
        })
        .await
    }

    /// Send `method` and return its non-null result.
    pub async fn call_value(
        &self,
        ctx: &Context,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, ClientError> {
        let resp = self.call_raw(ctx, method, params).await?;
        match resp.into_result() {
            Err(error) => {
                tracing::debug!(method, code = error.code, message = %error.message, "rpc error envelope");
                Err(ClientError::Rpc {
                    method: method.to_string(),
                    error,
                })
            }
            Ok(None) => Err(ClientError::EmptyResult {
                method: method.to_string(),
            }),
            Ok(Some(value)) => Ok(value),
        }
    }

    /// Send `method` and deserialize its non-null result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError> {
        let value = self.call_value(ctx, method, params).await?;
        serde_json::from_value(value).map_err(|e| ClientError::decode(method, e))
    }
}

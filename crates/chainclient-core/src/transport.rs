//! The `RpcTransport` trait: the seam between account clients and the wire.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// The central async trait every RPC transport must implement.
///
/// A transport owns its retry policy: `send` either returns the envelope the
/// node delivered (including error envelopes, which are never retried) or the
/// last transport failure once the retry budget is spent.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` and synchronize their own internal
/// state (connection pools, counters); callers never lock around `send`.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the delivered envelope.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;
}

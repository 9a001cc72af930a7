//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request ID: string, number or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// A JSON-RPC 2.0 error object, as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC response envelope.
///
/// `result: null` and a missing `result` both deserialize to `None`; bitcoind
/// style nodes send `"error": null` on success, which is likewise `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default = "null_id")]
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

fn null_id() -> RpcId {
    RpcId::Null
}

impl JsonRpcResponse {
    /// A successful envelope carrying `result`.
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: RpcId::Number(id),
            result: Some(result),
            error: None,
        }
    }

    /// An error envelope carrying `error`.
    pub fn failure(id: u64, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: RpcId::Number(id),
            result: None,
            error: Some(error),
        }
    }

    /// Returns `true` if this envelope has a non-null result and no error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && matches!(self.result, Some(ref v) if !v.is_null())
    }

    /// Split the envelope into the node's error or the (possibly empty) result.
    ///
    /// An error always wins over a result when a node sends both.
    pub fn into_result(self) -> Result<Option<Value>, JsonRpcError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self.result.filter(|v| !v.is_null()))
    }
}

//! Scripted in-memory transport for client tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! the chain family crates' test suites.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// What the scripted node answers to one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A successful envelope.
    Result(Value),
    /// An error envelope.
    Error(JsonRpcError),
    /// An envelope with `result: null`.
    Null,
    /// A transport failure (`TransportError::Http`).
    Fail(String),
    /// Never answers; for cancellation tests.
    Hang,
}

impl Reply {
    pub fn result(value: Value) -> Self {
        Self::Result(value)
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self::Error(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        })
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }
}

/// Answers each method from a queue of replies; the last reply queued for a
/// method is repeated once the queue drains to it.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<JsonRpcRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for the next unanswered call of `method`.
    pub fn on(self, method: &str, reply: Reply) -> Self {
        self.push(method, reply);
        self
    }

    pub fn push(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The method names received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    fn next_reply(&self, method: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        let queue = replies.get_mut(method)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(req.clone());
        let id = match req.id {
            crate::request::RpcId::Number(n) => n,
            _ => 0,
        };
        match self.next_reply(&req.method) {
            Some(Reply::Result(value)) => Ok(JsonRpcResponse::success(id, value)),
            Some(Reply::Error(error)) => Ok(JsonRpcResponse::failure(id, error)),
            Some(Reply::Null) => Ok(JsonRpcResponse::success(id, Value::Null)),
            Some(Reply::Fail(reason)) => Err(TransportError::Http(reason)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(JsonRpcResponse::failure(
                id,
                JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", req.method),
                    data: None,
                },
            )),
        }
    }

    fn url(&self) -> &str {
        "scripted"
    }
}

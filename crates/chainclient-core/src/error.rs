//! Error types for ChainClient.
//!
//! Three layers, innermost first:
//! - [`TransportError`]: the request never produced a JSON-RPC envelope
//! - [`AddressError`]: an address representation failed validation
//! - [`ClientError`]: what every [`AccountClient`](crate::AccountClient)
//!   operation returns, annotated with the method, address, transaction id or
//!   pipeline stage it failed on

use std::fmt;

use thiserror::Error;

use crate::params::ChainFamily;
use crate::request::JsonRpcError;

// ─── Transport ────────────────────────────────────────────────────────────────

/// Errors that can occur while moving a request to the node and back.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, DNS failure and similar.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status and no JSON-RPC envelope.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response body could not be deserialized into a JSON-RPC envelope.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The transport could not be constructed from its configuration.
    #[error("Invalid transport configuration: {0}")]
    Config(String),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::Deserialization(_) | Self::Config(_) | Self::Other(_) => false,
        }
    }
}

/// HTTP status codes that indicate a transient server-side condition.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

// ─── Address ──────────────────────────────────────────────────────────────────

/// Validation failures raised by the address codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,

    #[error("invalid character {ch:?} at position {index}")]
    InvalidCharacter { ch: char, index: usize },

    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("checksum mismatch")]
    InvalidChecksum,

    #[error("version 0x{version} is not valid for network {network}")]
    UnknownVersion { version: String, network: String },

    #[error("{0}")]
    Malformed(String),
}

// ─── Call stages ──────────────────────────────────────────────────────────────

/// The stage of a contract-call pipeline an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStage {
    /// Calldata could not be decoded into the strategy's structured input.
    DeserializeCalldata,
    /// The target program/contract address is invalid for this network.
    DecodeAddress,
    /// No account address could be derived from the input and program.
    DeriveAccount,
    /// The read-only execution request failed (direct strategy).
    Execute,
    /// The account-state query failed (network or node error).
    FetchState,
    /// The returned payload was not in the expected shape or encoding.
    DecodeResponse,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeserializeCalldata => write!(f, "deserialize-calldata"),
            Self::DecodeAddress => write!(f, "decode-address"),
            Self::DeriveAccount => write!(f, "derive-account"),
            Self::Execute => write!(f, "execute"),
            Self::FetchState => write!(f, "fetch-state"),
            Self::DecodeResponse => write!(f, "decode-response"),
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Errors returned by every account client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The address does not decode under this client's chain parameters.
    #[error("invalid address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    /// Calldata does not decode into the structure the call strategy expects.
    #[error("invalid calldata: {reason}")]
    InvalidCalldata { reason: String },

    /// A transaction value is unusable for the requested operation.
    #[error("invalid transaction {tx_id}: {reason}")]
    InvalidTx { tx_id: String, reason: String },

    /// The network identifier bound to a transaction or served by an endpoint
    /// differs from the configured one.
    #[error("chain mismatch: expected {expected}, got {got}")]
    ChainMismatch { expected: String, got: String },

    /// The transaction is known but not yet included in a block.
    #[error("tx {tx_id} is pending")]
    Pending { tx_id: String },

    /// The transaction was included but its execution failed.
    #[error("tx {tx_id} reverted: {reason}")]
    Reverted { tx_id: String, reason: String },

    /// The request failed at the transport level after the retry budget.
    #[error("transport failure calling '{method}': {source}")]
    Transport {
        method: String,
        #[source]
        source: TransportError,
    },

    /// The node delivered an error envelope. Never retried.
    #[error("'{method}' returned {error}")]
    Rpc { method: String, error: JsonRpcError },

    /// The node delivered an envelope with a null or absent result.
    #[error("empty result from '{method}'")]
    EmptyResult { method: String },

    /// A transaction of another chain family was passed to this client.
    #[error("type mismatch: expected {expected} transaction, got {got}")]
    TypeMismatch {
        expected: ChainFamily,
        got: ChainFamily,
    },

    /// The result of a method does not parse into the expected structure.
    #[error("decoding result of '{method}': {reason}")]
    Decode { method: String, reason: String },

    /// A contract-call pipeline failed at the given stage.
    #[error("calling '{target}' failed at {stage}: {source}")]
    Call {
        stage: CallStage,
        target: String,
        #[source]
        source: Box<ClientError>,
    },

    /// Broadcasting a signed transaction failed.
    #[error("sending tx {tx_id}: {source}")]
    Broadcast {
        tx_id: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The operation has no meaning on this chain family.
    #[error("'{operation}' is not supported on {family} chains")]
    Unsupported {
        operation: &'static str,
        family: ChainFamily,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the operation finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// Shorthand for a [`ClientError::Decode`] from any displayable reason.
    pub fn decode(method: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Decode {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// [`ClientError::TypeMismatch`] for a transaction handed to a client of
    /// the `expected` family.
    pub fn type_mismatch(expected: ChainFamily, tx: &crate::tx::Tx) -> Self {
        Self::TypeMismatch {
            expected,
            got: tx.family(),
        }
    }

    /// Wrap a failed submission in [`ClientError::Broadcast`]. Cancellation
    /// passes through unwrapped.
    pub fn broadcast(tx_id: impl Into<String>, source: ClientError) -> Self {
        if source.is_cancellation() {
            return source;
        }
        Self::Broadcast {
            tx_id: tx_id.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for malformed caller input (address, calldata, tx value).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress { .. } | Self::InvalidCalldata { .. } | Self::InvalidTx { .. }
        )
    }

    /// Returns `true` for network failures, including failed broadcasts.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Broadcast { .. })
    }

    /// Returns `true` if the transaction is not yet included.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Returns `true` if the transaction was included but failed.
    pub fn is_reverted(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }

    /// Returns `true` if the caller cancelled or the deadline elapsed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// The pipeline stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<CallStage> {
        match self {
            Self::Call { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

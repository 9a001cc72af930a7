//! Contract-call dispatch.
//!
//! Each chain family plugs one [`ContractCaller`] strategy into its
//! `call_contract`: direct read-only execution (EVM) or
//! decode-derive-fetch-decode over account state (Solana). Strategies tag
//! their failures with a [`CallStage`] through [`StageExt::in_stage`].

use std::fmt;

use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::codec::Canonical;
use crate::context::Context;
use crate::error::{CallStage, ClientError};
use crate::rpc::RpcClient;

/// Opaque contract-call payload. JSON form is `0x`-prefixed hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct CallData(Vec<u8>);

impl CallData {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CallData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CallData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for CallData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CallData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Self).map_err(serde::de::Error::custom)
    }
}

impl Canonical for CallData {
    fn size_hint(&self) -> usize {
        4 + self.0.len()
    }
}

/// A contract-call dispatch strategy.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    async fn call(
        &self,
        ctx: &Context,
        rpc: &RpcClient,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError>;
}

/// Tag a pipeline step's failure with its stage and target.
pub trait StageExt<T> {
    /// Wrap an error in [`ClientError::Call`]. Cancellation passes through
    /// untagged so callers can always tell it apart from a stage failure.
    fn in_stage(self, stage: CallStage, target: &Address) -> Result<T, ClientError>;
}

impl<T> StageExt<T> for Result<T, ClientError> {
    fn in_stage(self, stage: CallStage, target: &Address) -> Result<T, ClientError> {
        self.map_err(|e| {
            if e.is_cancellation() {
                return e;
            }
            tracing::debug!(%stage, target = %target, error = %e, "contract call stage failed");
            ClientError::Call {
                stage,
                target: target.to_string(),
                source: Box::new(e),
            }
        })
    }
}

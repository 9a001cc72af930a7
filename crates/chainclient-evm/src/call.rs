//! Direct read-only execution via `eth_call`.

use alloy_primitives::Bytes;
use async_trait::async_trait;
use serde_json::json;

use chainclient_core::address::{Address, AddressCodec};
use chainclient_core::call::{CallData, ContractCaller, StageExt};
use chainclient_core::context::Context;
use chainclient_core::error::{CallStage, ClientError};
use chainclient_core::rpc::RpcClient;

use crate::address::HexCodec;

/// Sends the target and the opaque calldata as one `eth_call` against the
/// configured block tag and returns the raw result bytes.
#[derive(Debug, Clone)]
pub struct DirectCall {
    block: String,
}

impl Default for DirectCall {
    fn default() -> Self {
        Self {
            block: "latest".to_string(),
        }
    }
}

impl DirectCall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute against a block tag (`"latest"`, `"safe"`, `"finalized"`) or a
    /// hex block number instead of the head.
    pub fn at_block(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
        }
    }
}

#[async_trait]
impl ContractCaller for DirectCall {
    async fn call(
        &self,
        ctx: &Context,
        rpc: &RpcClient,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError> {
        let to = HexCodec
            .decode_checked(target)
            .in_stage(CallStage::DecodeAddress, target)?;
        let request = json!({
            "to": format!("0x{to}"),
            "data": calldata.to_string(),
        });
        let out: Bytes = rpc
            .call(ctx, "eth_call", vec![request, json!(self.block)])
            .await
            .in_stage(CallStage::Execute, target)?;
        Ok(out.to_vec())
    }
}

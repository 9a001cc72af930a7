//! Account client for Ethereum-compatible JSON-RPC nodes.

use std::sync::Arc;

use alloy_primitives::{Address as EvmAddress, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use chainclient_core::account::{confirmations, AccountClient, FeeEstimate};
use chainclient_core::address::{Address, AddressCodec};
use chainclient_core::call::{CallData, ContractCaller};
use chainclient_core::context::Context;
use chainclient_core::error::ClientError;
use chainclient_core::params::{ChainFamily, ChainParameters, EvmParams};
use chainclient_core::rpc::RpcClient;
use chainclient_core::transport::RpcTransport;
use chainclient_core::tx::{EvmTx, Tx, TxId};

use crate::address::HexCodec;
use crate::call::DirectCall;

/// Transaction object as returned by `eth_getTransactionByHash`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    hash: B256,
    nonce: U64,
    from: EvmAddress,
    #[serde(default)]
    to: Option<EvmAddress>,
    value: U256,
    input: Bytes,
    /// `null` while the transaction is in the mempool.
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    chain_id: Option<U64>,
    #[serde(default)]
    v: Option<U64>,
}

impl RpcTransaction {
    /// Network identifier the signature is bound to. Typed transactions
    /// carry it explicitly; legacy EIP-155 ones encode it in `v`.
    fn bound_chain_id(&self) -> Option<u64> {
        if let Some(id) = self.chain_id {
            return Some(id.to::<u64>());
        }
        match self.v.map(|v| v.to::<u64>()) {
            Some(v) if v >= 35 => Some((v - 35) / 2),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    block_number: U64,
    /// Absent on pre-Byzantium receipts, which carry a state root instead.
    #[serde(default)]
    status: Option<U64>,
}

/// [`AccountClient`] for one EVM network.
pub struct EvmClient {
    rpc: RpcClient,
    params: EvmParams,
    codec: HexCodec,
    caller: Arc<dyn ContractCaller>,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("network", &self.params.network)
            .field("chain_id", &self.params.chain_id)
            .field("rpc", &self.rpc)
            .finish()
    }
}

impl EvmClient {
    /// Build a client without contacting the node.
    pub fn new(transport: Arc<dyn RpcTransport>, params: EvmParams) -> Self {
        Self {
            rpc: RpcClient::new(transport),
            params,
            codec: HexCodec,
            caller: Arc::new(DirectCall::new()),
        }
    }

    /// Build a client and verify the endpoint serves `params.chain_id`.
    pub async fn connect(
        ctx: &Context,
        transport: Arc<dyn RpcTransport>,
        params: EvmParams,
    ) -> Result<Self, ClientError> {
        let client = Self::new(transport, params);
        client.verify_chain_id(ctx).await?;
        Ok(client)
    }

    /// Replace the contract-call strategy.
    pub fn with_caller(mut self, caller: Arc<dyn ContractCaller>) -> Self {
        self.caller = caller;
        self
    }

    /// Network identifier reported by the endpoint.
    pub async fn chain_id(&self, ctx: &Context) -> Result<u64, ClientError> {
        let id: U64 = self.rpc.call(ctx, "eth_chainId", vec![]).await?;
        Ok(id.to::<u64>())
    }

    pub async fn verify_chain_id(&self, ctx: &Context) -> Result<(), ClientError> {
        let served = self.chain_id(ctx).await?;
        if served != self.params.chain_id {
            tracing::error!(
                expected = self.params.chain_id,
                served,
                url = %self.rpc.url(),
                "endpoint serves a different chain"
            );
            return Err(self.mismatch(served));
        }
        Ok(())
    }

    fn mismatch(&self, got: u64) -> ClientError {
        ClientError::ChainMismatch {
            expected: self.params.chain_id.to_string(),
            got: got.to_string(),
        }
    }

    fn hex_address(&self, address: &Address) -> Result<String, ClientError> {
        let raw = self.codec.decode_checked(address)?;
        Ok(format!("0x{raw}"))
    }
}

#[async_trait]
impl AccountClient for EvmClient {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn params(&self) -> ChainParameters {
        ChainParameters::Evm(self.params)
    }

    async fn latest_block(&self, ctx: &Context) -> Result<u64, ClientError> {
        let height: U64 = self.rpc.call(ctx, "eth_blockNumber", vec![]).await?;
        Ok(height.to::<u64>())
    }

    async fn tx(&self, ctx: &Context, tx_id: &TxId) -> Result<(Tx, u64), ClientError> {
        let hash = format!("0x{tx_id}");
        let rpc_tx: RpcTransaction = self
            .rpc
            .call(ctx, "eth_getTransactionByHash", vec![json!(hash)])
            .await?;

        let chain_id = rpc_tx.bound_chain_id();
        if let Some(id) = chain_id {
            if id != self.params.chain_id {
                return Err(self.mismatch(id));
            }
        }

        if rpc_tx.block_number.is_none() {
            return Err(ClientError::Pending { tx_id: hash });
        }

        let receipt: RpcReceipt = match self
            .rpc
            .call(ctx, "eth_getTransactionReceipt", vec![json!(hash)])
            .await
        {
            Ok(receipt) => receipt,
            Err(ClientError::EmptyResult { .. }) => {
                return Err(ClientError::Pending { tx_id: hash });
            }
            Err(e) => return Err(e),
        };
        if receipt.status == Some(U64::ZERO) {
            return Err(ClientError::Reverted {
                tx_id: hash,
                reason: "receipt status 0".to_string(),
            });
        }

        let latest = self.latest_block(ctx).await?;
        let depth = confirmations(latest, receipt.block_number.to::<u64>());
        tracing::debug!(tx = %hash, depth, "transaction confirmed");

        let tx = EvmTx {
            hash: rpc_tx.hash,
            nonce: rpc_tx.nonce.to::<u64>(),
            from: rpc_tx.from,
            to: rpc_tx.to,
            value: rpc_tx.value,
            input: rpc_tx.input,
            chain_id,
            raw: None,
        };
        Ok((Tx::Evm(tx), depth))
    }

    async fn submit_tx(&self, ctx: &Context, tx: &Tx) -> Result<(), ClientError> {
        let evm = match tx {
            Tx::Evm(evm) => evm,
            other => return Err(ClientError::type_mismatch(ChainFamily::Evm, other)),
        };
        let tx_id = evm.hash.to_string();
        let Some(raw) = &evm.raw else {
            return Err(ClientError::InvalidTx {
                tx_id,
                reason: "no signed payload to broadcast".to_string(),
            });
        };
        if let Some(id) = evm.chain_id {
            if id != self.params.chain_id {
                return Err(self.mismatch(id));
            }
        }

        let accepted: B256 = self
            .rpc
            .call(ctx, "eth_sendRawTransaction", vec![json!(raw)])
            .await
            .map_err(|e| ClientError::broadcast(tx_id.clone(), e))?;
        if accepted != evm.hash {
            tracing::warn!(expected = %tx_id, accepted = %accepted, "node reported a different tx hash");
        }
        tracing::debug!(tx = %accepted, network = self.params.network, "transaction submitted");
        Ok(())
    }

    async fn account_nonce(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        let addr = self.hex_address(address)?;
        let nonce: U64 = self
            .rpc
            .call(ctx, "eth_getTransactionCount", vec![json!(addr), json!("latest")])
            .await?;
        Ok(U256::from(nonce.to::<u64>()))
    }

    async fn account_balance(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        let addr = self.hex_address(address)?;
        self.rpc
            .call(ctx, "eth_getBalance", vec![json!(addr), json!("latest")])
            .await
    }

    async fn call_contract(
        &self,
        ctx: &Context,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError> {
        self.caller.call(ctx, &self.rpc, target, calldata).await
    }

    /// Legacy gas price in wei, plus the EIP-1559 tip where the node serves one.
    async fn estimate_fee(&self, ctx: &Context) -> Result<FeeEstimate, ClientError> {
        let price: U256 = self.rpc.call(ctx, "eth_gasPrice", vec![]).await?;
        let fee = FeeEstimate::new(price);
        match self.rpc.call::<U256>(ctx, "eth_maxPriorityFeePerGas", vec![]).await {
            Ok(tip) => Ok(fee.with_priority(tip)),
            // Pre-London chains and some gateways lack the method.
            Err(ClientError::Rpc { error, .. }) => {
                tracing::debug!(code = error.code, network = self.params.network, "no priority fee quote");
                Ok(fee)
            }
            Err(e) => Err(e),
        }
    }
}

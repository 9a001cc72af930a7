//! Account client for Solana JSON-RPC nodes.
//!
//! Confirmation depth is measured in slots. A signature whose status is
//! still `processed` has not been voted on by the cluster and is reported
//! as pending.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use chainclient_core::account::{confirmations, AccountClient, FeeEstimate};
use chainclient_core::address::{Address, AddressCodec};
use chainclient_core::call::{CallData, ContractCaller};
use chainclient_core::context::Context;
use chainclient_core::error::ClientError;
use chainclient_core::params::{ChainFamily, ChainParameters, SolanaParams};
use chainclient_core::rpc::RpcClient;
use chainclient_core::transport::RpcTransport;
use chainclient_core::tx::{SolanaTx, Tx, TxId};

use crate::address::Base58Codec;
use crate::call::AccountStateCall;

/// `{ context, value }` wrapper used by most Solana methods.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    slot: u64,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    confirmation_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrioritizationFee {
    prioritization_fee: u64,
}

#[derive(Debug, Deserialize)]
struct EncodedTransaction {
    /// `[payload, encoding]`.
    transaction: (String, String),
}

/// [`AccountClient`] for one Solana cluster.
pub struct SolanaClient {
    rpc: RpcClient,
    params: SolanaParams,
    codec: Base58Codec,
    caller: Arc<dyn ContractCaller>,
}

impl std::fmt::Debug for SolanaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaClient")
            .field("network", &self.params.network)
            .field("commitment", &self.params.commitment)
            .field("rpc", &self.rpc)
            .finish()
    }
}

impl SolanaClient {
    pub fn new(transport: Arc<dyn RpcTransport>, params: SolanaParams) -> Self {
        Self {
            rpc: RpcClient::new(transport),
            params,
            codec: Base58Codec,
            caller: Arc::new(AccountStateCall::new(params.commitment)),
        }
    }

    /// Replace the contract-call strategy.
    pub fn with_caller(mut self, caller: Arc<dyn ContractCaller>) -> Self {
        self.caller = caller;
        self
    }

    fn commitment(&self) -> Value {
        json!({ "commitment": self.params.commitment })
    }

    async fn signature_status(
        &self,
        ctx: &Context,
        signature: &str,
    ) -> Result<SignatureStatus, ClientError> {
        const METHOD: &str = "getSignatureStatuses";
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .rpc
            .call(
                ctx,
                METHOD,
                vec![json!([signature]), json!({ "searchTransactionHistory": true })],
            )
            .await?;
        statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| ClientError::EmptyResult {
                method: METHOD.to_string(),
            })
    }
}

#[async_trait]
impl AccountClient for SolanaClient {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    fn params(&self) -> ChainParameters {
        ChainParameters::Solana(self.params)
    }

    async fn latest_block(&self, ctx: &Context) -> Result<u64, ClientError> {
        self.rpc.call(ctx, "getSlot", vec![self.commitment()]).await
    }

    async fn tx(&self, ctx: &Context, tx_id: &TxId) -> Result<(Tx, u64), ClientError> {
        let signature = bs58::encode(tx_id.as_bytes()).into_string();
        let status = self.signature_status(ctx, &signature).await?;
        if let Some(err) = status.err {
            return Err(ClientError::Reverted {
                tx_id: signature,
                reason: err.to_string(),
            });
        }
        if status.confirmation_status.as_deref() == Some("processed") {
            return Err(ClientError::Pending { tx_id: signature });
        }

        let encoded: EncodedTransaction = match self
            .rpc
            .call(
                ctx,
                "getTransaction",
                vec![
                    json!(signature),
                    json!({
                        "encoding": "base58",
                        "commitment": self.params.commitment,
                        "maxSupportedTransactionVersion": 0,
                    }),
                ],
            )
            .await
        {
            Ok(encoded) => encoded,
            // Not yet visible at the configured commitment.
            Err(ClientError::EmptyResult { .. }) => {
                return Err(ClientError::Pending { tx_id: signature });
            }
            Err(e) => return Err(e),
        };
        let (payload, encoding) = encoded.transaction;
        if encoding != "base58" {
            return Err(ClientError::decode(
                "getTransaction",
                format!("unexpected encoding '{encoding}'"),
            ));
        }
        let raw = bs58::decode(payload)
            .into_vec()
            .map_err(|e| ClientError::decode("getTransaction", e))?;

        let latest = self.latest_block(ctx).await?;
        let tx = Tx::Solana(SolanaTx {
            signature: tx_id.clone(),
            slot: Some(status.slot),
            raw,
        });
        Ok((tx, confirmations(latest, status.slot)))
    }

    async fn submit_tx(&self, ctx: &Context, tx: &Tx) -> Result<(), ClientError> {
        let solana = match tx {
            Tx::Solana(solana) => solana,
            other => return Err(ClientError::type_mismatch(ChainFamily::Solana, other)),
        };
        let signature = bs58::encode(solana.signature.as_bytes()).into_string();
        let payload = bs58::encode(&solana.raw).into_string();
        let accepted: String = self
            .rpc
            .call(
                ctx,
                "sendTransaction",
                vec![
                    json!(payload),
                    json!({ "encoding": "base58", "preflightCommitment": self.params.commitment }),
                ],
            )
            .await
            .map_err(|e| ClientError::broadcast(signature.clone(), e))?;
        if accepted != signature {
            tracing::warn!(expected = %signature, accepted = %accepted, "node reported a different signature");
        }
        tracing::debug!(signature = %accepted, network = self.params.network, "transaction submitted");
        Ok(())
    }

    async fn account_nonce(&self, _ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        self.codec.decode_checked(address)?;
        Err(ClientError::Unsupported {
            operation: "account_nonce",
            family: ChainFamily::Solana,
        })
    }

    /// Balance in lamports.
    async fn account_balance(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        self.codec.decode_checked(address)?;
        let balance: WithContext<u64> = self
            .rpc
            .call(ctx, "getBalance", vec![json!(address), self.commitment()])
            .await?;
        Ok(U256::from(balance.value))
    }

    async fn call_contract(
        &self,
        ctx: &Context,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError> {
        self.caller.call(ctx, &self.rpc, target, calldata).await
    }

    /// Median prioritization fee over the node's recent slots, in
    /// micro-lamports per compute unit. Zero when no slot paid one.
    async fn estimate_fee(&self, ctx: &Context) -> Result<FeeEstimate, ClientError> {
        let recent: Vec<PrioritizationFee> = self
            .rpc
            .call(ctx, "getRecentPrioritizationFees", vec![])
            .await?;
        let mut fees: Vec<u64> = recent.into_iter().map(|f| f.prioritization_fee).collect();
        fees.sort_unstable();
        let median = fees.get(fees.len() / 2).copied().unwrap_or(0);
        tracing::debug!(slots = fees.len(), median, network = self.params.network, "prioritization fees");
        Ok(FeeEstimate::new(U256::from(median)))
    }
}

//! Account client for bitcoind-style JSON-RPC nodes.
//!
//! UTXO chains have no account nonce and no contract state; those operations
//! validate their address argument and then fail with
//! [`ClientError::Unsupported`].

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Number, Value};

use chainclient_core::account::{confirmations, AccountClient, FeeEstimate};
use chainclient_core::address::{Address, AddressCodec};
use chainclient_core::call::CallData;
use chainclient_core::context::Context;
use chainclient_core::error::ClientError;
use chainclient_core::params::{ChainFamily, ChainParameters, UtxoParams};
use chainclient_core::rpc::RpcClient;
use chainclient_core::transport::RpcTransport;
use chainclient_core::tx::{Tx, TxId, UtxoTx};

use crate::address::Base58CheckCodec;
use crate::amount::coins_to_base_units;

/// Confirmation target, in blocks, for fee estimates.
pub const DEFAULT_FEE_TARGET: u32 = 6;

/// Virtual bytes per kilo-vbyte, the unit of node fee rates.
const VBYTES_PER_KVB: u64 = 1_000;

#[derive(Debug, Deserialize)]
struct VerboseTx {
    hex: String,
    /// Absent while the transaction sits in the mempool.
    #[serde(default)]
    blockhash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    height: u64,
}

#[derive(Debug, Deserialize)]
struct ScanResult {
    #[serde(default = "default_success")]
    success: bool,
    total_amount: Number,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SmartFee {
    /// Coins per kvB; absent when the node has too little data.
    #[serde(default)]
    feerate: Option<Number>,
    #[serde(default)]
    errors: Vec<String>,
}

/// [`AccountClient`] for one UTXO network.
pub struct UtxoClient {
    rpc: RpcClient,
    params: UtxoParams,
    codec: Base58CheckCodec,
    fee_target: u32,
}

impl std::fmt::Debug for UtxoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtxoClient")
            .field("network", &self.params.network)
            .field("rpc", &self.rpc)
            .finish()
    }
}

impl UtxoClient {
    pub fn new(transport: Arc<dyn RpcTransport>, params: UtxoParams) -> Self {
        Self {
            rpc: RpcClient::new(transport),
            params,
            codec: Base58CheckCodec::new(params),
            fee_target: DEFAULT_FEE_TARGET,
        }
    }

    /// Confirmation target passed to `estimatesmartfee`.
    pub fn with_fee_target(mut self, blocks: u32) -> Self {
        self.fee_target = blocks.max(1);
        self
    }

    pub fn codec(&self) -> &Base58CheckCodec {
        &self.codec
    }
}

#[async_trait]
impl AccountClient for UtxoClient {
    fn family(&self) -> ChainFamily {
        ChainFamily::Utxo
    }

    fn params(&self) -> ChainParameters {
        ChainParameters::Utxo(self.params)
    }

    async fn latest_block(&self, ctx: &Context) -> Result<u64, ClientError> {
        self.rpc.call(ctx, "getblockcount", vec![]).await
    }

    async fn tx(&self, ctx: &Context, tx_id: &TxId) -> Result<(Tx, u64), ClientError> {
        let verbose: VerboseTx = self
            .rpc
            .call(ctx, "getrawtransaction", vec![json!(tx_id.to_string()), json!(true)])
            .await?;
        let raw = hex::decode(&verbose.hex)
            .map_err(|e| ClientError::decode("getrawtransaction", format!("hex field: {e}")))?;

        let Some(blockhash) = verbose.blockhash else {
            return Err(ClientError::Pending {
                tx_id: tx_id.to_string(),
            });
        };
        let header: BlockHeader = self
            .rpc
            .call(ctx, "getblockheader", vec![json!(blockhash), json!(true)])
            .await?;
        let latest = self.latest_block(ctx).await?;

        let tx = Tx::Utxo(UtxoTx {
            txid: tx_id.clone(),
            raw,
        });
        Ok((tx, confirmations(latest, header.height)))
    }

    async fn submit_tx(&self, ctx: &Context, tx: &Tx) -> Result<(), ClientError> {
        let utxo = match tx {
            Tx::Utxo(utxo) => utxo,
            other => return Err(ClientError::type_mismatch(ChainFamily::Utxo, other)),
        };
        let tx_id = utxo.txid.to_string();
        let accepted: String = self
            .rpc
            .call(ctx, "sendrawtransaction", vec![json!(hex::encode(&utxo.raw))])
            .await
            .map_err(|e| ClientError::broadcast(tx_id.clone(), e))?;
        if accepted != tx_id {
            tracing::warn!(expected = %tx_id, accepted = %accepted, "node reported a different txid");
        }
        tracing::debug!(tx_id = %accepted, network = self.params.network, "transaction submitted");
        Ok(())
    }

    async fn account_nonce(&self, _ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        self.codec.decode_checked(address)?;
        Err(ClientError::Unsupported {
            operation: "account_nonce",
            family: ChainFamily::Utxo,
        })
    }

    /// Sum of the unspent outputs paying to `address`, via `scantxoutset`.
    /// The node scans its whole UTXO set, which can take tens of seconds.
    async fn account_balance(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError> {
        self.codec.decode_checked(address)?;
        let descriptor: Value = json!([format!("addr({address})")]);
        let scan: ScanResult = self
            .rpc
            .call(ctx, "scantxoutset", vec![json!("start"), descriptor])
            .await?;
        if !scan.success {
            return Err(ClientError::decode("scantxoutset", "scan did not complete"));
        }
        coins_to_base_units(&scan.total_amount)
            .map_err(|reason| ClientError::decode("scantxoutset", reason))
    }

    /// Fee rate for confirmation within the configured target, in base units
    /// per virtual byte, rounded up.
    async fn estimate_fee(&self, ctx: &Context) -> Result<FeeEstimate, ClientError> {
        const METHOD: &str = "estimatesmartfee";
        let fee: SmartFee = self.rpc.call(ctx, METHOD, vec![json!(self.fee_target)]).await?;
        let Some(feerate) = fee.feerate else {
            tracing::debug!(errors = ?fee.errors, target = self.fee_target, "node has no fee estimate");
            return Err(ClientError::EmptyResult {
                method: METHOD.to_string(),
            });
        };
        let per_kvb = coins_to_base_units(&feerate).map_err(|reason| ClientError::decode(METHOD, reason))?;
        let per_vbyte = per_kvb.div_ceil(U256::from(VBYTES_PER_KVB));
        Ok(FeeEstimate::new(per_vbyte))
    }

    async fn call_contract(
        &self,
        _ctx: &Context,
        target: &Address,
        _calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError> {
        self.codec.decode_checked(target)?;
        Err(ClientError::Unsupported {
            operation: "call_contract",
            family: ChainFamily::Utxo,
        })
    }
}

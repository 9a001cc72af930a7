//! The account client contract shared by every chain family.

use alloy_primitives::U256;
use async_trait::async_trait;

use crate::address::Address;
use crate::call::CallData;
use crate::context::Context;
use crate::error::ClientError;
use crate::params::{ChainFamily, ChainParameters};
use crate::tx::{Tx, TxId};

/// Where a transaction stands relative to the current chain head.
///
/// Recomputed on every lookup; a reorganization can move a transaction from
/// `Confirmed` back to `Pending` or lower its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Known to the node but not included in a block.
    Pending,
    /// Included; the depth is the number of blocks on top of its block.
    Confirmed(u64),
    /// Included, but execution failed.
    Reverted,
}

impl ConfirmationStatus {
    /// Collapse a [`AccountClient::tx`] lookup into a status. Errors other
    /// than pending/reverted are passed through.
    pub fn from_lookup<T>(lookup: Result<(T, u64), ClientError>) -> Result<Self, ClientError> {
        match lookup {
            Ok((_, depth)) => Ok(Self::Confirmed(depth)),
            Err(e) if e.is_pending() => Ok(Self::Pending),
            Err(e) if e.is_reverted() => Ok(Self::Reverted),
            Err(e) => Err(e),
        }
    }

    /// Returns `true` once the transaction has at least `required` blocks on top.
    pub fn is_final(&self, required: u64) -> bool {
        matches!(self, Self::Confirmed(depth) if *depth >= required)
    }
}

/// A fee quote for a new transaction.
///
/// `price` is in the family's fee unit: base units per virtual byte (UTXO),
/// wei per gas (EVM) or micro-lamports per compute unit (Solana).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub price: U256,
    /// Tip over the protocol base fee, on networks that price it separately.
    pub priority: Option<U256>,
}

impl FeeEstimate {
    pub fn new(price: U256) -> Self {
        Self { price, priority: None }
    }

    pub fn with_priority(mut self, priority: U256) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Confirmation depth of a transaction included at `included_at` when the head
/// is `latest`. Zero means "in the latest block"; a head behind the inclusion
/// height (lagging node, reorg) also yields zero.
pub fn confirmations(latest: u64, included_at: u64) -> u64 {
    if latest < included_at {
        tracing::debug!(latest, included_at, "chain head behind inclusion height");
    }
    latest.saturating_sub(included_at)
}

/// One contract, implemented once per chain family and parameterized by that
/// family's [`ChainParameters`].
///
/// Every method decodes its address arguments under the client's parameters
/// before touching the network, and every method honours the [`Context`].
///
/// # Thread Safety
/// Implementations are `Send + Sync`; all methods take `&self` and may be
/// called concurrently without external locking.
#[async_trait]
pub trait AccountClient: Send + Sync {
    fn family(&self) -> ChainFamily;

    fn params(&self) -> ChainParameters;

    /// Height (or slot) of the current chain head.
    async fn latest_block(&self, ctx: &Context) -> Result<u64, ClientError>;

    /// Look up a transaction and its confirmation depth.
    ///
    /// Fails with `ChainMismatch` for a transaction bound to another network,
    /// `Pending` when not yet included and `Reverted` when execution failed.
    async fn tx(&self, ctx: &Context, tx_id: &TxId) -> Result<(Tx, u64), ClientError>;

    /// Broadcast an already-signed transaction of this client's family.
    async fn submit_tx(&self, ctx: &Context, tx: &Tx) -> Result<(), ClientError>;

    /// Point-in-time next nonce for `address`. Not a reservation.
    async fn account_nonce(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError>;

    /// Current balance of `address` in the chain's base unit.
    async fn account_balance(&self, ctx: &Context, address: &Address) -> Result<U256, ClientError>;

    /// Read-only contract invocation.
    async fn call_contract(
        &self,
        ctx: &Context,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError>;

    /// Current fee quote. A snapshot; fees move every block.
    async fn estimate_fee(&self, ctx: &Context) -> Result<FeeEstimate, ClientError>;

    /// [`tx`](Self::tx) collapsed into a [`ConfirmationStatus`], for
    /// caller-side polling loops.
    async fn confirmation_status(
        &self,
        ctx: &Context,
        tx_id: &TxId,
    ) -> Result<ConfirmationStatus, ClientError> {
        ConfirmationStatus::from_lookup(self.tx(ctx, tx_id).await)
    }
}

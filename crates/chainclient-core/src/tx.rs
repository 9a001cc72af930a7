//! Signed transactions as a closed tagged union over chain families.
//!
//! Signing is out of scope: values arrive here already signed. A client only
//! accepts the variant of its own family; any other variant is a
//! [`ClientError::TypeMismatch`](crate::ClientError::TypeMismatch).

use std::fmt;

use alloy_primitives::{keccak256, Address as EvmAddress, Bytes, B256, U256};

use crate::error::ClientError;
use crate::params::ChainFamily;

/// Transaction identity: txid, hash or signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(Vec<u8>);

impl TxId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(s).map(Self)
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

impl From<B256> for TxId {
    fn from(hash: B256) -> Self {
        Self(hash.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for TxId {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

// ─── Family variants ──────────────────────────────────────────────────────────

/// A UTXO transaction in its consensus serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoTx {
    /// Txid in RPC (display) byte order.
    pub txid: TxId,
    pub raw: Vec<u8>,
}

/// An EVM transaction.
///
/// Lookups fill in the decoded fields; `raw` is only present for values built
/// from a signed envelope and is what [`submit_tx`](crate::AccountClient::submit_tx)
/// broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvmTx {
    pub hash: B256,
    pub nonce: u64,
    pub from: EvmAddress,
    pub to: Option<EvmAddress>,
    pub value: U256,
    pub input: Bytes,
    /// Network identifier bound by replay protection; `None` if unprotected.
    pub chain_id: Option<u64>,
    pub raw: Option<Bytes>,
}

/// Highest EIP-2718 transaction type byte; larger first bytes start an RLP list.
const MAX_TX_TYPE: u8 = 0x7f;

/// Field index of `v` in a legacy transaction list.
const LEGACY_V_INDEX: usize = 6;
const LEGACY_FIELDS: usize = 9;

impl EvmTx {
    /// Wrap a signed RLP/EIP-2718 envelope; the hash is its keccak-256.
    ///
    /// The network identifier is read from the envelope: the first field of a
    /// typed transaction, or the EIP-155 `v` of a legacy one. A legacy
    /// transaction signed with `v` of 27 or 28 is unprotected.
    pub fn from_signed(raw: impl Into<Bytes>) -> Result<Self, ClientError> {
        let raw = raw.into();
        let hash = keccak256(&raw);
        let chain_id = envelope_chain_id(&raw).map_err(|reason| ClientError::InvalidTx {
            tx_id: hash.to_string(),
            reason,
        })?;
        Ok(Self {
            hash,
            chain_id,
            raw: Some(raw),
            ..Default::default()
        })
    }

    /// Returns `true` if the transaction is bound to a network identifier.
    pub fn is_protected(&self) -> bool {
        self.chain_id.is_some()
    }
}

fn envelope_chain_id(raw: &[u8]) -> Result<Option<u64>, String> {
    let Some((&first, rest)) = raw.split_first() else {
        return Err("empty envelope".into());
    };
    let malformed = |e: rlp::DecoderError| format!("malformed envelope: {e}");

    if first <= MAX_TX_TYPE {
        let fields = rlp::Rlp::new(rest);
        if !fields.is_list() {
            return Err(format!("type {first:#04x} payload is not a list"));
        }
        return fields.val_at::<u64>(0).map(Some).map_err(malformed);
    }

    let fields = rlp::Rlp::new(raw);
    if !fields.is_list() {
        return Err("legacy payload is not a list".into());
    }
    let count = fields.item_count().map_err(malformed)?;
    if count != LEGACY_FIELDS {
        return Err(format!("legacy transaction has {count} fields, want {LEGACY_FIELDS}"));
    }
    match fields.val_at::<u128>(LEGACY_V_INDEX).map_err(malformed)? {
        27 | 28 => Ok(None),
        v if v >= 35 => u64::try_from((v - 35) / 2)
            .map(Some)
            .map_err(|_| format!("network identifier in v={v} out of range")),
        v => Err(format!("invalid signature v={v}")),
    }
}

/// A Solana transaction in wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaTx {
    /// First signature of the transaction, which is its identity.
    pub signature: TxId,
    /// Slot the transaction landed in, when known.
    pub slot: Option<u64>,
    pub raw: Vec<u8>,
}

/// A signed transaction of any supported family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tx {
    Utxo(UtxoTx),
    Evm(EvmTx),
    Solana(SolanaTx),
}

impl Tx {
    pub fn family(&self) -> ChainFamily {
        match self {
            Self::Utxo(_) => ChainFamily::Utxo,
            Self::Evm(_) => ChainFamily::Evm,
            Self::Solana(_) => ChainFamily::Solana,
        }
    }

    pub fn id(&self) -> TxId {
        match self {
            Self::Utxo(tx) => tx.txid.clone(),
            Self::Evm(tx) => tx.hash.into(),
            Self::Solana(tx) => tx.signature.clone(),
        }
    }
}

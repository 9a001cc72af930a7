//! Decode-derive-fetch-decode contract calls.
//!
//! Solana programs keep their results in accounts rather than returning them
//! from a read-only execution. A call decodes the calldata into a
//! [`NonceInput`], derives the program account holding the state for that
//! nonce, fetches the account and returns its data bytes. Every step tags its
//! failure with the matching [`CallStage`].

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use chainclient_core::address::{Address, RawAddress};
use chainclient_core::call::{CallData, ContractCaller, StageExt};
use chainclient_core::codec::{self, u256_le, Canonical};
use chainclient_core::context::Context;
use chainclient_core::error::{CallStage, ClientError};
use chainclient_core::rpc::RpcClient;

use crate::address::{Base58Codec, PUBKEY_LEN};
use crate::derive::{ProgramAddressDeriver, SolanaPda};

const GET_ACCOUNT_INFO: &str = "getAccountInfo";

/// Calldata understood by [`AccountStateCall`]: the nonce the program keyed
/// its state account by.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NonceInput {
    #[borsh(serialize_with = "u256_le::serialize", deserialize_with = "u256_le::deserialize")]
    pub nonce: U256,
}

impl NonceInput {
    pub fn new(nonce: U256) -> Self {
        Self { nonce }
    }

    /// Derivation seed: the nonce as 32 big-endian bytes.
    pub fn seed(&self) -> [u8; 32] {
        self.nonce.to_be_bytes::<32>()
    }

    pub fn to_calldata(&self) -> Result<CallData, codec::CodecError> {
        codec::to_binary(self).map(CallData::from)
    }
}

impl Canonical for NonceInput {
    fn size_hint(&self) -> usize {
        u256_le::SIZE
    }
}

/// State record a gateway program writes per burn, as returned in the
/// account data of a nonce-keyed call.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BurnRecord {
    #[borsh(serialize_with = "u256_le::serialize", deserialize_with = "u256_le::deserialize")]
    pub amount: U256,
    pub recipient: RawAddress,
    pub confs: u64,
    pub payload: Vec<u8>,
}

impl BurnRecord {
    pub fn decode(bytes: &[u8]) -> Result<Self, codec::CodecError> {
        codec::from_binary(bytes)
    }
}

impl Canonical for BurnRecord {
    fn size_hint(&self) -> usize {
        u256_le::SIZE + self.recipient.size_hint() + 8 + 4 + self.payload.len()
    }
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    value: Option<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    data: AccountData,
}

/// Nodes return `data` either as a bare string (legacy binary encoding) or
/// as `[payload, encoding]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountData {
    Bare(String),
    Tagged(String, String),
}

impl AccountData {
    fn decode(self) -> Result<Vec<u8>, String> {
        let payload = match self {
            Self::Bare(payload) => payload,
            Self::Tagged(payload, encoding) if encoding == "base58" => payload,
            Self::Tagged(_, encoding) => return Err(format!("unexpected data encoding '{encoding}'")),
        };
        bs58::decode(payload)
            .into_vec()
            .map_err(|e| format!("account data is not base58: {e}"))
    }
}

/// The decode-derive-fetch-decode [`ContractCaller`].
pub struct AccountStateCall {
    deriver: Arc<dyn ProgramAddressDeriver>,
    commitment: String,
}

impl std::fmt::Debug for AccountStateCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStateCall")
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl AccountStateCall {
    pub fn new(commitment: impl Into<String>) -> Self {
        Self {
            deriver: Arc::new(SolanaPda),
            commitment: commitment.into(),
        }
    }

    /// Replace the account derivation rule.
    pub fn with_deriver(mut self, deriver: Arc<dyn ProgramAddressDeriver>) -> Self {
        self.deriver = deriver;
        self
    }

    /// The account a call with `input` against `program` reads.
    pub fn derive_account(
        &self,
        input: &NonceInput,
        program: &[u8; PUBKEY_LEN],
    ) -> Result<[u8; PUBKEY_LEN], ClientError> {
        let seed = input.seed();
        let (account, bump) = self
            .deriver
            .derive(&[&seed], program)
            .map_err(|e| ClientError::InvalidCalldata {
                reason: format!("deriving state account: {e}"),
            })?;
        tracing::debug!(bump, "derived state account");
        Ok(account)
    }
}

#[async_trait]
impl ContractCaller for AccountStateCall {
    async fn call(
        &self,
        ctx: &Context,
        rpc: &RpcClient,
        target: &Address,
        calldata: &CallData,
    ) -> Result<Vec<u8>, ClientError> {
        let input: NonceInput = codec::from_binary(calldata.as_bytes())
            .map_err(|e| ClientError::InvalidCalldata {
                reason: e.to_string(),
            })
            .in_stage(CallStage::DeserializeCalldata, target)?;

        let program = Base58Codec
            .decode_key(target)
            .map_err(|source| ClientError::InvalidAddress {
                address: target.to_string(),
                source,
            })
            .in_stage(CallStage::DecodeAddress, target)?;

        let account = self
            .derive_account(&input, &program)
            .in_stage(CallStage::DeriveAccount, target)?;
        let account = Base58Codec.encode_key(&account);

        let result: Value = rpc
            .call_value(
                ctx,
                GET_ACCOUNT_INFO,
                vec![
                    json!(account),
                    json!({ "encoding": "base58", "commitment": self.commitment }),
                ],
            )
            .await
            .in_stage(CallStage::FetchState, target)?;

        let info: AccountInfoResult = serde_json::from_value(result)
            .map_err(|e| ClientError::decode(GET_ACCOUNT_INFO, e))
            .in_stage(CallStage::DecodeResponse, target)?;
        let Some(info) = info.value else {
            return Err(ClientError::decode(GET_ACCOUNT_INFO, format!("account {account} does not exist")))
                .in_stage(CallStage::DecodeResponse, target);
        };
        info.data
            .decode()
            .map_err(|reason| ClientError::decode(GET_ACCOUNT_INFO, reason))
            .in_stage(CallStage::DecodeResponse, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_input_is_32_bytes_little_endian() {
        let input = NonceInput::new(U256::from(5u64));
        let calldata = input.to_calldata().unwrap();
        assert_eq!(calldata.len(), 32);
        assert_eq!(calldata.as_bytes()[0], 5);
        assert_eq!(input.seed()[31], 5);
        assert_eq!(codec::from_binary::<NonceInput>(calldata.as_bytes()).unwrap(), input);
    }

    #[test]
    fn account_data_shapes() {
        let bare: AccountData = serde_json::from_value(json!("2g")).unwrap();
        assert_eq!(bare.decode().unwrap(), vec![0x61]);
        let tagged: AccountData = serde_json::from_value(json!(["2g", "base58"])).unwrap();
        assert_eq!(tagged.decode().unwrap(), vec![0x61]);
        let base64: AccountData = serde_json::from_value(json!(["YQ==", "base64"])).unwrap();
        assert!(base64.decode().is_err());
        let garbage: AccountData = serde_json::from_value(json!("0OIl")).unwrap();
        assert!(garbage.decode().is_err());
    }

    #[test]
    fn burn_record_round_trip() {
        let record = BurnRecord {
            amount: U256::from(1_000u64),
            recipient: RawAddress::new(vec![9u8; 20]),
            confs: 6,
            payload: vec![1, 2, 3],
        };
        let bytes = codec::to_binary(&record).unwrap();
        assert_eq!(bytes.len(), record.size_hint());
        assert_eq!(BurnRecord::decode(&bytes).unwrap(), record);
        assert!(BurnRecord::decode(&bytes[..bytes.len() - 1]).is_err());
    }
}

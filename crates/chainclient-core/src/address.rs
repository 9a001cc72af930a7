//! Network-scoped addresses and the codec contract that decodes them.
//!
//! An [`Address`] is the human/wire representation; it means nothing without
//! the [`ChainParameters`](crate::ChainParameters) of the network it belongs
//! to. A [`RawAddress`] is the canonical binary form an [`AddressCodec`]
//! produces from it after validating length, alphabet, checksum and version.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::Canonical;
use crate::error::{AddressError, ClientError};
use crate::params::ChainFamily;

// ─── Address ──────────────────────────────────────────────────────────────────

/// Human-readable address representation, e.g. a base58 or `0x` hex string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(repr: impl Into<String>) -> Self {
        Self(repr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Canonical for Address {
    fn size_hint(&self) -> usize {
        4 + self.0.len()
    }
}

// ─── RawAddress ───────────────────────────────────────────────────────────────

/// Canonical binary address. Its length is fixed per chain family; the JSON
/// form is lowercase hex without a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct RawAddress(Vec<u8>);

impl RawAddress {
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

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Copy into a fixed-size array, failing on any other length.
    pub fn to_array<const N: usize>(&self) -> Result<[u8; N], AddressError> {
        self.0.as_slice().try_into().map_err(|_| AddressError::InvalidLength {
            expected: N,
            got: self.0.len(),
        })
    }
}

impl From<Vec<u8>> for RawAddress {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for RawAddress {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for RawAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RawAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for RawAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

impl Canonical for RawAddress {
    fn size_hint(&self) -> usize {
        4 + self.0.len()
    }
}

// ─── Codec contract ───────────────────────────────────────────────────────────

/// Decodes and encodes addresses of one chain family under one network's
/// parameters.
///
/// Implementations must validate length, alphabet and checksum before
/// indexing into the input, and must return an error (never panic) for any
/// input, including arbitrary non-ASCII strings and wrong-length buffers.
pub trait AddressCodec: Send + Sync {
    fn family(&self) -> ChainFamily;

    /// Decode a representation into its canonical binary form.
    fn decode(&self, address: &Address) -> Result<RawAddress, AddressError>;

    /// Encode a canonical binary address back into its representation.
    fn encode(&self, raw: &RawAddress) -> Result<Address, AddressError>;

    /// Decode and annotate failures with the offending address.
    fn decode_checked(&self, address: &Address) -> Result<RawAddress, ClientError> {
        self.decode(address).map_err(|source| ClientError::InvalidAddress {
            address: address.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_binary, from_json, to_binary, to_json};

    #[test]
    fn raw_address_binary_is_length_prefixed() {
        let raw = RawAddress::from([0xabu8; 20]);
        let bytes = to_binary(&raw).unwrap();
        assert_eq!(bytes.len(), raw.size_hint());
        assert_eq!(&bytes[..4], &20u32.to_le_bytes());
        assert_eq!(from_binary::<RawAddress>(&bytes).unwrap(), raw);
    }

    #[test]
    fn raw_address_json_is_hex() {
        let raw = RawAddress::new(vec![0x00, 0x01, 0xfe]);
        let json = to_json(&raw).unwrap();
        assert_eq!(json, "\"0001fe\"");
        assert_eq!(from_json::<RawAddress>(&json).unwrap(), raw);
        assert!(from_json::<RawAddress>("\"zz\"").is_err());
    }

    #[test]
    fn to_array_checks_length() {
        let raw = RawAddress::new(vec![1, 2, 3]);
        assert_eq!(raw.to_array::<3>().unwrap(), [1, 2, 3]);
        assert_eq!(
            raw.to_array::<20>().unwrap_err(),
            AddressError::InvalidLength { expected: 20, got: 3 }
        );
    }

    #[test]
    fn address_json_is_transparent() {
        let addr = Address::from("DBLsEv4FdFPGrMWzcagDQvoKgUL2CikhMf");
        assert_eq!(to_json(&addr).unwrap(), "\"DBLsEv4FdFPGrMWzcagDQvoKgUL2CikhMf\"");
    }
}

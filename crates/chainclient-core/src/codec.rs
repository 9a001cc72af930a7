//! Canonical binary and JSON encoding of wire values.
//!
//! The binary form is Borsh: fixed-width little-endian integers, `u32`
//! length-prefixed byte vectors and strings, fields in declaration order.
//! Decoding rejects truncated input and trailing bytes. The JSON form is the
//! value's serde representation.

use alloy_primitives::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while encoding or decoding a canonical value.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("binary codec: {0}")]
    Binary(#[from] borsh::io::Error),

    #[error("JSON codec: {0}")]
    Json(#[from] serde_json::Error),
}

/// A value with a deterministic binary form and a lossless JSON form.
pub trait Canonical: BorshSerialize + BorshDeserialize + Serialize + DeserializeOwned {
    /// Exact length in bytes of the value's binary form.
    fn size_hint(&self) -> usize;
}

pub fn to_binary<T: Canonical>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(value.size_hint());
    BorshSerialize::serialize(value, &mut buf)?;
    Ok(buf)
}

/// Decode a value, rejecting truncated input and trailing bytes.
pub fn from_binary<T: Canonical>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(borsh::from_slice(bytes)?)
}

pub fn to_json<T: Canonical>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

pub fn from_json<T: Canonical>(json: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(json)?)
}

/// Borsh field adapter for [`U256`]: 32 bytes, little-endian.
///
/// ```ignore
/// #[borsh(serialize_with = "u256_le::serialize", deserialize_with = "u256_le::deserialize")]
/// nonce: U256,
/// ```
pub mod u256_le {
    use super::U256;
    use borsh::io::{Read, Result, Write};

    pub const SIZE: usize = 32;

    pub fn serialize<W: Write>(value: &U256, writer: &mut W) -> Result<()> {
        writer.write_all(&value.to_le_bytes::<SIZE>())
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<U256> {
        let mut buf = [0u8; SIZE];
        reader.read_exact(&mut buf)?;
        Ok(U256::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
    struct Amount {
        #[borsh(serialize_with = "u256_le::serialize", deserialize_with = "u256_le::deserialize")]
        value: U256,
    }

    impl Canonical for Amount {
        fn size_hint(&self) -> usize {
            u256_le::SIZE
        }
    }

    #[test]
    fn u256_is_32_bytes_little_endian() {
        let amount = Amount { value: U256::from(0x0102u64) };
        let bytes = to_binary(&amount).unwrap();
        assert_eq!(bytes.len(), amount.size_hint());
        assert_eq!(&bytes[..2], &[0x02, 0x01]);
        assert!(bytes[2..].iter().all(|b| *b == 0));
        assert_eq!(from_binary::<Amount>(&bytes).unwrap(), amount);
    }

    #[test]
    fn truncated_and_trailing_input_rejected() {
        let bytes = to_binary(&Amount { value: U256::MAX }).unwrap();
        assert!(from_binary::<Amount>(&bytes[..31]).is_err());
        let mut long = bytes.clone();
        long.push(0);
        assert!(from_binary::<Amount>(&long).is_err());
    }

    #[test]
    fn json_round_trip() {
        let amount = Amount { value: U256::from(1_000_000_007u64) };
        let json = to_json(&amount).unwrap();
        assert_eq!(from_json::<Amount>(&json).unwrap(), amount);
    }
}

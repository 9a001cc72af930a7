//! Solana account keys: 32 bytes, base58 without checksum.

use chainclient_core::address::{Address, AddressCodec, RawAddress};
use chainclient_core::error::AddressError;
use chainclient_core::params::ChainFamily;

/// Length of an account key.
pub const PUBKEY_LEN: usize = 32;

/// Longest base58 rendering of a 32-byte key.
const MAX_ENCODED_LEN: usize = 44;

const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58 codec for account keys. Every Solana cluster shares one format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58Codec;

impl Base58Codec {
    pub fn new() -> Self {
        Self
    }

    /// Decode straight into a fixed-size key.
    pub fn decode_key(&self, address: &Address) -> Result<[u8; PUBKEY_LEN], AddressError> {
        self.decode(address)?.to_array::<PUBKEY_LEN>()
    }

    /// Render a fixed-size key.
    pub fn encode_key(&self, key: &[u8; PUBKEY_LEN]) -> Address {
        Address::new(bs58::encode(key).into_string())
    }
}

impl AddressCodec for Base58Codec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    fn decode(&self, address: &Address) -> Result<RawAddress, AddressError> {
        let s = address.as_str();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if let Some((index, ch)) = s.chars().enumerate().find(|(_, c)| !ALPHABET.contains(*c)) {
            return Err(AddressError::InvalidCharacter { ch, index });
        }
        if s.len() > MAX_ENCODED_LEN {
            return Err(AddressError::Malformed(format!(
                "representation longer than {MAX_ENCODED_LEN} characters"
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::Malformed(e.to_string()))?;
        if bytes.len() != PUBKEY_LEN {
            return Err(AddressError::InvalidLength {
                expected: PUBKEY_LEN,
                got: bytes.len(),
            });
        }
        Ok(RawAddress::new(bytes))
    }

    fn encode(&self, raw: &RawAddress) -> Result<Address, AddressError> {
        let key = raw.to_array::<PUBKEY_LEN>()?;
        Ok(self.encode_key(&key))
    }
}

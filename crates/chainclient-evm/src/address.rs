//! `0x`-prefixed hex addresses of 20 bytes.
//!
//! Decoding accepts the prefix optionally and any letter case. Mixed-case
//! input is treated as an EIP-55 checksum and must match; all-lower and
//! all-upper input carries no checksum. Encoding always emits the EIP-55 form.

use alloy_primitives::Address as EvmAddress;

use chainclient_core::address::{Address, AddressCodec, RawAddress};
use chainclient_core::error::AddressError;
use chainclient_core::params::ChainFamily;

/// Length of an EVM account address.
pub const ADDRESS_LEN: usize = 20;

/// Hex codec for EVM addresses. Stateless: every EVM network shares one
/// address format.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodec;

impl HexCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode straight into the `alloy` address type.
    pub fn decode_evm(&self, address: &Address) -> Result<EvmAddress, AddressError> {
        let raw = self.decode(address)?;
        Ok(EvmAddress::from(raw.to_array::<ADDRESS_LEN>()?))
    }
}

fn has_mixed_case(body: &str) -> bool {
    body.chars().any(|c| c.is_ascii_uppercase()) && body.chars().any(|c| c.is_ascii_lowercase())
}

impl AddressCodec for HexCodec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn decode(&self, address: &Address) -> Result<RawAddress, AddressError> {
        let s = address.as_str();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let (offset, body) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(body) => (2, body),
            None => (0, s),
        };
        if let Some((index, ch)) = body.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacter {
                ch,
                index: index + offset,
            });
        }
        if body.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN,
                got: body.len() / 2,
            });
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(body, &mut bytes).map_err(|e| AddressError::Malformed(e.to_string()))?;

        if has_mixed_case(body) {
            let checksummed = EvmAddress::from(bytes).to_checksum(None);
            if checksummed[2..] != *body {
                return Err(AddressError::InvalidChecksum);
            }
        }
        Ok(RawAddress::from(bytes))
    }

    fn encode(&self, raw: &RawAddress) -> Result<Address, AddressError> {
        let bytes = raw.to_array::<ADDRESS_LEN>()?;
        Ok(Address::new(EvmAddress::from(bytes).to_checksum(None)))
    }
}

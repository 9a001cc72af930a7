//! Address codecs selected by chain family.

use chainclient_core::address::{Address, AddressCodec, RawAddress};
use chainclient_core::error::AddressError;
use chainclient_core::params::ChainParameters;
use chainclient_evm::HexCodec;
use chainclient_solana::Base58Codec;
use chainclient_utxo::Base58CheckCodec;

/// The codec for addresses of the network described by `params`.
pub fn codec_for(params: &ChainParameters) -> Box<dyn AddressCodec> {
    match params {
        ChainParameters::Utxo(p) => Box::new(Base58CheckCodec::new(*p)),
        ChainParameters::Evm(_) => Box::new(HexCodec),
        ChainParameters::Solana(_) => Box::new(Base58Codec),
    }
}

/// Decode `address` under `params`. An address of another network of the
/// same family is rejected.
pub fn decode(address: &Address, params: &ChainParameters) -> Result<RawAddress, AddressError> {
    codec_for(params).decode(address)
}

pub fn encode(raw: &RawAddress, params: &ChainParameters) -> Result<Address, AddressError> {
    codec_for(params).encode(raw)
}

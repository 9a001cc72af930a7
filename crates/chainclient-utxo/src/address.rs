//! Base58check addresses: `base58(version ‖ hash160 ‖ checksum)`.
//!
//! The checksum is the first four bytes of `sha256(sha256(version ‖ hash160))`.
//! The canonical binary form is `version ‖ hash160` without the checksum, so
//! decode and encode round-trip exactly for every valid address.

use sha2::{Digest, Sha256};

use chainclient_core::address::{Address, AddressCodec, RawAddress};
use chainclient_core::error::AddressError;
use chainclient_core::params::{ChainFamily, UtxoParams};

/// Length of the hash160 payload behind the version prefix.
pub const HASH_LEN: usize = 20;

/// Length of the trailing double-SHA-256 checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Representations longer than this are rejected before decoding.
const MAX_ENCODED_LEN: usize = 64;

const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// First four bytes of the double SHA-256 of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Which kind of output an address pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PubkeyHash,
    ScriptHash,
}

/// Base58check codec bound to one UTXO network's version prefixes.
#[derive(Debug, Clone, Copy)]
pub struct Base58CheckCodec {
    params: UtxoParams,
}

impl Base58CheckCodec {
    pub fn new(params: UtxoParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &UtxoParams {
        &self.params
    }

    /// Classify a decoded address by its version prefix.
    pub fn kind(&self, raw: &RawAddress) -> Option<AddressKind> {
        let payload = raw.as_bytes();
        let matches = |versions: &[&[u8]]| {
            versions
                .iter()
                .any(|v| payload.len() == v.len() + HASH_LEN && payload.starts_with(v))
        };
        if matches(self.params.pubkey_hash_versions) {
            Some(AddressKind::PubkeyHash)
        } else if matches(self.params.script_hash_versions) {
            Some(AddressKind::ScriptHash)
        } else {
            None
        }
    }

    /// Check that `payload` is `version ‖ hash160` for a version of this network.
    fn check_payload(&self, payload: &[u8]) -> Result<(), AddressError> {
        let fits = |v: &[u8]| payload.len() == v.len() + HASH_LEN;
        if !self.params.versions().any(fits) {
            let expected = self
                .params
                .versions()
                .map(|v| v.len() + HASH_LEN)
                .next()
                .unwrap_or(1 + HASH_LEN);
            return Err(AddressError::InvalidLength {
                expected,
                got: payload.len(),
            });
        }
        if self
            .params
            .versions()
            .any(|v| fits(v) && payload.starts_with(v))
        {
            return Ok(());
        }
        Err(AddressError::UnknownVersion {
            version: hex::encode(&payload[..payload.len() - HASH_LEN]),
            network: self.params.network.to_string(),
        })
    }
}

impl AddressCodec for Base58CheckCodec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Utxo
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
        if bytes.len() <= CHECKSUM_LEN {
            return Err(AddressError::InvalidLength {
                expected: CHECKSUM_LEN + 1 + HASH_LEN,
                got: bytes.len(),
            });
        }

        let (payload, sum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if checksum(payload) != sum {
            return Err(AddressError::InvalidChecksum);
        }
        self.check_payload(payload)?;
        Ok(RawAddress::new(payload))
    }

    fn encode(&self, raw: &RawAddress) -> Result<Address, AddressError> {
        let payload = raw.as_bytes();
        if payload.is_empty() {
            return Err(AddressError::Empty);
        }
        self.check_payload(payload)?;
        let mut bytes = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&checksum(payload));
        Ok(Address::new(bs58::encode(bytes).into_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainclient_core::params::networks;

    const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    const BITCOIN_P2SH: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";
    const DIGIBYTE: &str = "DBLsEv4FdFPGrMWzcagDQvoKgUL2CikhMf";

    fn codec(params: UtxoParams) -> Base58CheckCodec {
        Base58CheckCodec::new(params)
    }

    #[test]
    fn decodes_bitcoin_addresses() {
        let c = codec(networks::BITCOIN_MAINNET);
        let raw = c.decode(&GENESIS.into()).unwrap();
        assert_eq!(raw.len(), 21);
        assert_eq!(raw.as_bytes()[0], 0x00);
        assert_eq!(c.kind(&raw), Some(AddressKind::PubkeyHash));

        let p2sh = c.decode(&BITCOIN_P2SH.into()).unwrap();
        assert_eq!(p2sh.as_bytes()[0], 0x05);
        assert_eq!(c.kind(&p2sh), Some(AddressKind::ScriptHash));
    }

    #[test]
    fn decodes_digibyte_mainnet_address() {
        let c = codec(networks::DIGIBYTE_MAINNET);
        let raw = c.decode(&DIGIBYTE.into()).unwrap();
        assert_eq!(raw.as_bytes()[0], 0x1e);
        assert_eq!(c.encode(&raw).unwrap().as_str(), DIGIBYTE);
    }

    #[test]
    fn rejects_other_network_versions() {
        let err = codec(networks::DIGIBYTE_MAINNET)
            .decode(&GENESIS.into())
            .unwrap_err();
        assert_eq!(
            err,
            AddressError::UnknownVersion {
                version: "00".into(),
                network: "digibyte-mainnet".into(),
            }
        );
        assert!(codec(networks::BITCOIN_TESTNET).decode(&GENESIS.into()).is_err());
        assert!(codec(networks::BITCOIN_MAINNET).decode(&DIGIBYTE.into()).is_err());
    }

    #[test]
    fn dogecoin_and_digibyte_share_pubkey_hash_version() {
        // Both mainnets assign 0x1e to pay-to-pubkey-hash, so these addresses
        // are indistinguishable; only script-hash versions tell them apart.
        let doge = codec(networks::DOGECOIN_MAINNET);
        let dgb = codec(networks::DIGIBYTE_MAINNET);
        assert_eq!(doge.decode(&DIGIBYTE.into()).unwrap(), dgb.decode(&DIGIBYTE.into()).unwrap());

        let mut script = vec![0x3f];
        script.extend_from_slice(&[9u8; HASH_LEN]);
        let dgb_script = dgb.encode(&RawAddress::new(script)).unwrap();
        assert!(matches!(doge.decode(&dgb_script), Err(AddressError::UnknownVersion { .. })));
    }

    #[test]
    fn rejects_bad_checksum() {
        let tampered = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb";
        assert_eq!(
            codec(networks::BITCOIN_MAINNET).decode(&tampered.into()).unwrap_err(),
            AddressError::InvalidChecksum
        );
    }

    #[test]
    fn rejects_malformed_input_without_panicking() {
        let c = codec(networks::BITCOIN_MAINNET);
        assert_eq!(c.decode(&"".into()).unwrap_err(), AddressError::Empty);
        assert_eq!(
            c.decode(&"1A1z0P".into()).unwrap_err(),
            AddressError::InvalidCharacter { ch: '0', index: 4 }
        );
        assert_eq!(
            c.decode(&Address::new(char::from_u32(256).unwrap().to_string()))
                .unwrap_err(),
            AddressError::InvalidCharacter { ch: '\u{100}', index: 0 }
        );
        assert!(c.decode(&"1".into()).is_err());
        assert!(c.decode(&"1111111111111111111111111111111111111111111111111111111111111111111".into()).is_err());
    }

    #[test]
    fn multi_byte_versions() {
        let c = codec(networks::ZCASH_MAINNET);
        let mut payload = vec![0x1c, 0xb8];
        payload.extend_from_slice(&[7u8; HASH_LEN]);
        let addr = c.encode(&RawAddress::new(payload.clone())).unwrap();
        assert!(addr.as_str().starts_with("t1"));
        assert_eq!(c.decode(&addr).unwrap().as_bytes(), &payload[..]);

        // Single-byte prefix with a 21-byte payload does not fit zcash lengths.
        let err = c.encode(&RawAddress::new(vec![0u8; 21])).unwrap_err();
        assert_eq!(err, AddressError::InvalidLength { expected: 22, got: 21 });
    }

    #[test]
    fn encode_validates_version_and_length() {
        let c = codec(networks::DOGECOIN_MAINNET);
        let mut payload = vec![0x1e];
        payload.extend_from_slice(&[1u8; HASH_LEN]);
        let addr = c.encode(&RawAddress::new(payload)).unwrap();
        assert!(addr.as_str().starts_with('D'));

        let mut foreign = vec![0x00];
        foreign.extend_from_slice(&[1u8; HASH_LEN]);
        assert!(matches!(
            c.encode(&RawAddress::new(foreign)),
            Err(AddressError::UnknownVersion { .. })
        ));
        assert!(c.encode(&RawAddress::new(vec![0x1e; 5])).is_err());
        assert_eq!(c.encode(&RawAddress::default()).unwrap_err(), AddressError::Empty);
    }
}

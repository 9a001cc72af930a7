//! Chain families and per-network parameter tables.
//!
//! Networks of one family differ only in data: adding a network means adding
//! a constant to [`networks`], never a new client type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural family a network belongs to.
/// Determines which address codec and account client serve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Base58check addresses, bitcoind-style JSON-RPC.
    Utxo,
    /// 20-byte hex addresses, nonce/balance state, Ethereum JSON-RPC.
    Evm,
    /// 32-byte base58 account keys, program-derived accounts.
    Solana,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Utxo => write!(f, "utxo"),
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Solana => write!(f, "solana"),
        }
    }
}

/// Address versions and endpoint defaults of a UTXO network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtxoParams {
    /// Slug, e.g. "bitcoin-mainnet".
    pub network: &'static str,
    /// Version prefixes of pay-to-pubkey-hash addresses.
    pub pubkey_hash_versions: &'static [&'static [u8]],
    /// Version prefixes of pay-to-script-hash addresses.
    pub script_hash_versions: &'static [&'static [u8]],
    pub default_rpc_url: &'static str,
}

impl UtxoParams {
    /// Every version prefix an address of this network may carry.
    pub fn versions(&self) -> impl Iterator<Item = &'static [u8]> {
        self.pubkey_hash_versions
            .iter()
            .chain(self.script_hash_versions.iter())
            .copied()
    }
}

/// Network identifier and endpoint default of an EVM network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmParams {
    pub network: &'static str,
    /// EIP-155 chain id bound into replay-protected transactions.
    pub chain_id: u64,
    pub default_rpc_url: &'static str,
}

/// Endpoint default and commitment level of a Solana cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolanaParams {
    pub network: &'static str,
    pub default_rpc_url: &'static str,
    /// Commitment used for slot and signature queries.
    pub commitment: &'static str,
}

/// Immutable parameter set of one network, shared by every client for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainParameters {
    Utxo(UtxoParams),
    Evm(EvmParams),
    Solana(SolanaParams),
}

impl ChainParameters {
    pub fn family(&self) -> ChainFamily {
        match self {
            Self::Utxo(_) => ChainFamily::Utxo,
            Self::Evm(_) => ChainFamily::Evm,
            Self::Solana(_) => ChainFamily::Solana,
        }
    }

    pub fn network(&self) -> &'static str {
        match self {
            Self::Utxo(p) => p.network,
            Self::Evm(p) => p.network,
            Self::Solana(p) => p.network,
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Utxo(p) => p.default_rpc_url,
            Self::Evm(p) => p.default_rpc_url,
            Self::Solana(p) => p.default_rpc_url,
        }
    }
}

impl From<UtxoParams> for ChainParameters {
    fn from(p: UtxoParams) -> Self {
        Self::Utxo(p)
    }
}

impl From<EvmParams> for ChainParameters {
    fn from(p: EvmParams) -> Self {
        Self::Evm(p)
    }
}

impl From<SolanaParams> for ChainParameters {
    fn from(p: SolanaParams) -> Self {
        Self::Solana(p)
    }
}

impl fmt::Display for ChainParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network())
    }
}

/// Well-known networks.
pub mod networks {
    use super::{ChainParameters, EvmParams, SolanaParams, UtxoParams};

    // ─── UTXO ─────────────────────────────────────────────────────────────────

    pub const BITCOIN_MAINNET: UtxoParams = UtxoParams {
        network: "bitcoin-mainnet",
        pubkey_hash_versions: &[&[0x00]],
        script_hash_versions: &[&[0x05]],
        default_rpc_url: "http://127.0.0.1:8332",
    };

    pub const BITCOIN_TESTNET: UtxoParams = UtxoParams {
        network: "bitcoin-testnet",
        pubkey_hash_versions: &[&[0x6f]],
        script_hash_versions: &[&[0xc4]],
        default_rpc_url: "http://127.0.0.1:18332",
    };

    pub const BITCOIN_REGTEST: UtxoParams = UtxoParams {
        network: "bitcoin-regtest",
        pubkey_hash_versions: &[&[0x6f]],
        script_hash_versions: &[&[0xc4]],
        default_rpc_url: "http://127.0.0.1:18443",
    };

    pub const DOGECOIN_MAINNET: UtxoParams = UtxoParams {
        network: "dogecoin-mainnet",
        pubkey_hash_versions: &[&[0x1e]],
        script_hash_versions: &[&[0x16]],
        default_rpc_url: "http://127.0.0.1:22555",
    };

    pub const DOGECOIN_TESTNET: UtxoParams = UtxoParams {
        network: "dogecoin-testnet",
        pubkey_hash_versions: &[&[0x71]],
        script_hash_versions: &[&[0xc4]],
        default_rpc_url: "http://127.0.0.1:44555",
    };

    pub const DOGECOIN_REGTEST: UtxoParams = UtxoParams {
        network: "dogecoin-regtest",
        pubkey_hash_versions: &[&[0x6f]],
        script_hash_versions: &[&[0xc4]],
        default_rpc_url: "http://127.0.0.1:18332",
    };

    /// DigiByte still accepts the legacy `0x05` script-hash prefix.
    pub const DIGIBYTE_MAINNET: UtxoParams = UtxoParams {
        network: "digibyte-mainnet",
        pubkey_hash_versions: &[&[0x1e]],
        script_hash_versions: &[&[0x3f], &[0x05]],
        default_rpc_url: "http://127.0.0.1:14022",
    };

    pub const DIGIBYTE_TESTNET: UtxoParams = UtxoParams {
        network: "digibyte-testnet",
        pubkey_hash_versions: &[&[0x7e]],
        script_hash_versions: &[&[0x8c]],
        default_rpc_url: "http://127.0.0.1:14023",
    };

    pub const DIGIBYTE_REGTEST: UtxoParams = UtxoParams {
        network: "digibyte-regtest",
        pubkey_hash_versions: &[&[0x7e]],
        script_hash_versions: &[&[0x8c]],
        default_rpc_url: "http://127.0.0.1:18443",
    };

    /// Transparent addresses only; two-byte prefixes.
    pub const ZCASH_MAINNET: UtxoParams = UtxoParams {
        network: "zcash-mainnet",
        pubkey_hash_versions: &[&[0x1c, 0xb8]],
        script_hash_versions: &[&[0x1c, 0xbd]],
        default_rpc_url: "http://127.0.0.1:8232",
    };

    pub const ZCASH_TESTNET: UtxoParams = UtxoParams {
        network: "zcash-testnet",
        pubkey_hash_versions: &[&[0x1d, 0x25]],
        script_hash_versions: &[&[0x1c, 0xba]],
        default_rpc_url: "http://127.0.0.1:18232",
    };

    // ─── EVM ──────────────────────────────────────────────────────────────────

    pub const ETHEREUM: EvmParams = EvmParams {
        network: "ethereum",
        chain_id: 1,
        default_rpc_url: "http://127.0.0.1:8545/",
    };

    pub const GOERLI: EvmParams = EvmParams {
        network: "goerli",
        chain_id: 5,
        default_rpc_url: "http://127.0.0.1:8545/",
    };

    pub const SEPOLIA: EvmParams = EvmParams {
        network: "sepolia",
        chain_id: 11_155_111,
        default_rpc_url: "http://127.0.0.1:8545/",
    };

    pub const POLYGON: EvmParams = EvmParams {
        network: "polygon",
        chain_id: 137,
        default_rpc_url: "http://127.0.0.1:8545/",
    };

    pub const AVALANCHE: EvmParams = EvmParams {
        network: "avalanche",
        chain_id: 43_114,
        default_rpc_url: "http://127.0.0.1:9650/ext/bc/C/rpc",
    };

    pub const FANTOM: EvmParams = EvmParams {
        network: "fantom",
        chain_id: 250,
        default_rpc_url: "http://127.0.0.1:18545/",
    };

    pub const ARBITRUM: EvmParams = EvmParams {
        network: "arbitrum",
        chain_id: 42_161,
        default_rpc_url: "http://127.0.0.1:8547/",
    };

    pub const BSC: EvmParams = EvmParams {
        network: "bsc",
        chain_id: 56,
        default_rpc_url: "http://127.0.0.1:8575/",
    };

    // ─── Solana ───────────────────────────────────────────────────────────────

    pub const SOLANA_MAINNET: SolanaParams = SolanaParams {
        network: "solana-mainnet",
        default_rpc_url: "https://api.mainnet-beta.solana.com",
        commitment: "confirmed",
    };

    pub const SOLANA_DEVNET: SolanaParams = SolanaParams {
        network: "solana-devnet",
        default_rpc_url: "https://api.devnet.solana.com",
        commitment: "confirmed",
    };

    pub const SOLANA_LOCALNET: SolanaParams = SolanaParams {
        network: "solana-localnet",
        default_rpc_url: "http://localhost:8899",
        commitment: "confirmed",
    };

    /// Every built-in network.
    pub const ALL: &[ChainParameters] = &[
        ChainParameters::Utxo(BITCOIN_MAINNET),
        ChainParameters::Utxo(BITCOIN_TESTNET),
        ChainParameters::Utxo(BITCOIN_REGTEST),
        ChainParameters::Utxo(DOGECOIN_MAINNET),
        ChainParameters::Utxo(DOGECOIN_TESTNET),
        ChainParameters::Utxo(DOGECOIN_REGTEST),
        ChainParameters::Utxo(DIGIBYTE_MAINNET),
        ChainParameters::Utxo(DIGIBYTE_TESTNET),
        ChainParameters::Utxo(DIGIBYTE_REGTEST),
        ChainParameters::Utxo(ZCASH_MAINNET),
        ChainParameters::Utxo(ZCASH_TESTNET),
        ChainParameters::Evm(ETHEREUM),
        ChainParameters::Evm(GOERLI),
        ChainParameters::Evm(SEPOLIA),
        ChainParameters::Evm(POLYGON),
        ChainParameters::Evm(AVALANCHE),
        ChainParameters::Evm(FANTOM),
        ChainParameters::Evm(ARBITRUM),
        ChainParameters::Evm(BSC),
        ChainParameters::Solana(SOLANA_MAINNET),
        ChainParameters::Solana(SOLANA_DEVNET),
        ChainParameters::Solana(SOLANA_LOCALNET),
    ];

    /// Look up a built-in network by slug.
    pub fn by_name(network: &str) -> Option<ChainParameters> {
        ALL.iter().copied().find(|p| p.network() == network)
    }

    /// Look up a built-in EVM network by chain id.
    pub fn evm_by_chain_id(chain_id: u64) -> Option<EvmParams> {
        ALL.iter().find_map(|p| match p {
            ChainParameters::Evm(evm) if evm.chain_id == chain_id => Some(*evm),
            _ => None,
        })
    }
}

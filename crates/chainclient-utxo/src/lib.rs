//! chainclient-utxo: UTXO chain family for ChainClient.
//!
//! One codec and one client serve Bitcoin, Dogecoin, DigiByte and Zcash;
//! networks differ only in their [`UtxoParams`](chainclient_core::UtxoParams).
//!
//! # Quick start
//! ```rust,no_run
//! use chainclient_core::{networks, Address, AddressCodec};
//! use chainclient_utxo::Base58CheckCodec;
//!
//! let codec = Base58CheckCodec::new(networks::BITCOIN_MAINNET);
//! let raw = codec.decode(&Address::from("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"))?;
//! assert_eq!(raw.len(), 21);
//! # Ok::<(), chainclient_core::AddressError>(())
//! ```

pub mod address;
pub mod amount;
pub mod client;

pub use address::{AddressKind, Base58CheckCodec};
pub use client::UtxoClient;

//! chainclient-solana: Solana chain family for ChainClient.
//!
//! Contract calls on Solana read program-owned state instead of executing
//! code: see [`call::AccountStateCall`] for the stages a call goes through
//! and [`derive`] for how the state account is found.

pub mod address;
pub mod call;
pub mod client;
pub mod derive;

pub use address::Base58Codec;
pub use call::{AccountStateCall, BurnRecord, NonceInput};
pub use client::SolanaClient;
pub use derive::{find_program_address, DeriveError, ProgramAddressDeriver, SolanaPda};

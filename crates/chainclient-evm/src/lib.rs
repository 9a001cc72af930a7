//! chainclient-evm: EVM chain family for ChainClient.
//!
//! One codec and one client serve Ethereum, Polygon, Avalanche C-chain,
//! Fantom, Arbitrum, BSC and any other network described by an
//! [`EvmParams`](chainclient_core::EvmParams).
//!
//! # Quick start
//! ```rust,no_run
//! use std::sync::Arc;
//! use chainclient_core::{networks, AccountClient, Address, Context};
//! use chainclient_evm::EvmClient;
//! use chainclient_http::HttpRpcClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpRpcClient::default_for(networks::POLYGON.default_rpc_url)?);
//! let ctx = Context::background();
//! let client = EvmClient::connect(&ctx, transport, networks::POLYGON).await?;
//! let balance = client
//!     .account_balance(&ctx, &Address::from("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"))
//!     .await?;
//! println!("{balance}");
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod call;
pub mod client;

pub use address::HexCodec;
pub use call::DirectCall;
pub use client::EvmClient;

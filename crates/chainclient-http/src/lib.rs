//! chainclient-http: HTTP POST JSON-RPC transport for ChainClient.
//!
//! # Quick start
//! ```rust,no_run
//! use chainclient_http::{HttpClientConfig, HttpRpcClient};
//!
//! let transport = HttpRpcClient::new("http://127.0.0.1:8545/", HttpClientConfig::default())?;
//! # Ok::<(), chainclient_core::TransportError>(())
//! ```

pub mod client;

pub use client::{HttpClientConfig, HttpRpcClient};

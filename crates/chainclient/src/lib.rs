//! chainclient: one account client interface over UTXO, EVM and Solana chains.
//!
//! Pick a network from [`networks`], point it at an endpoint and get back an
//! [`AccountClient`] that answers the same questions whatever the family:
//! latest block, transaction lookup with confirmation depth, submission,
//! nonce, balance, fee quotes and read-only contract calls.
//!
//! ```rust,no_run
//! use chainclient::{connect, networks, Address, Context, NetworkConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Context::background();
//! let config = NetworkConfig::new(networks::SOLANA_DEVNET);
//! let client = connect(&ctx, &config).await?;
//! let lamports = client
//!     .account_balance(&ctx, &Address::from("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"))
//!     .await?;
//! println!("{lamports}");
//! # Ok(())
//! # }
//! ```
//!
//! The family crates can also be used on their own; this crate only adds
//! family dispatch for codecs and clients.

pub mod address;
pub mod connect;

pub use connect::{client_for, connect, ConnectError, NetworkConfig};

pub use chainclient_core::{
    confirmations, networks, AccountClient, Address, AddressCodec, AddressError, CallData,
    CallStage, ChainFamily, ChainParameters, ClientError, ConfirmationStatus, Context,
    ContractCaller, EvmParams, EvmTx, FeeEstimate, RawAddress, RpcTransport, SolanaParams, SolanaTx,
    TransportError, Tx, TxId, UtxoParams, UtxoTx,
};
pub use chainclient_evm::{DirectCall, EvmClient, HexCodec};
pub use chainclient_http::{HttpClientConfig, HttpRpcClient};
pub use chainclient_solana::{AccountStateCall, Base58Codec, NonceInput, SolanaClient};
pub use chainclient_utxo::{Base58CheckCodec, UtxoClient};

//! chainclient-core: foundation traits and types for ChainClient.
//!
//! # Overview
//!
//! ChainClient gives callers one contract for querying accounts, submitting
//! signed transactions and performing read-only contract calls across UTXO,
//! account-model and account-program blockchains. The core crate defines:
//!
//! - [`AccountClient`]: the per-family client contract
//! - [`AddressCodec`] / [`Address`] / [`RawAddress`]: network-scoped addressing
//! - [`ChainParameters`] and the [`params::networks`] registry
//! - [`Tx`]: the closed tagged union of signed transactions
//! - [`ContractCaller`]: the pluggable contract-call dispatch strategy
//! - [`RpcTransport`] / [`RpcClient`]: JSON-RPC transport and typed calls
//! - [`Context`]: per-operation cancellation and deadline
//! - [`ClientError`]: the structured error taxonomy
//! - [`policy`] module: bounded retry policy shared by every transport

pub mod account;
pub mod address;
pub mod call;
pub mod codec;
pub mod context;
pub mod error;
pub mod params;
pub mod policy;
pub mod request;
pub mod rpc;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod tx;

pub use account::{confirmations, AccountClient, ConfirmationStatus, FeeEstimate};
pub use address::{Address, AddressCodec, RawAddress};
pub use call::{CallData, ContractCaller, StageExt};
pub use codec::Canonical;
pub use context::Context;
pub use error::{AddressError, CallStage, ClientError, TransportError};
pub use params::{networks, ChainFamily, ChainParameters, EvmParams, SolanaParams, UtxoParams};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use rpc::RpcClient;
pub use transport::RpcTransport;
pub use tx::{EvmTx, SolanaTx, Tx, TxId, UtxoTx};

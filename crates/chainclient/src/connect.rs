//! Building a family client from a network configuration.

use std::sync::Arc;

use thiserror::Error;

use chainclient_core::account::AccountClient;
use chainclient_core::context::Context;
use chainclient_core::error::{ClientError, TransportError};
use chainclient_core::params::ChainParameters;
use chainclient_core::transport::RpcTransport;
use chainclient_evm::EvmClient;
use chainclient_http::{HttpClientConfig, HttpRpcClient};
use chainclient_solana::SolanaClient;
use chainclient_utxo::UtxoClient;

/// Everything needed to talk to one network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub params: ChainParameters,
    /// Endpoint override; `None` uses the network's default endpoint.
    pub rpc_url: Option<String>,
    pub http: HttpClientConfig,
}

impl NetworkConfig {
    pub fn new(params: impl Into<ChainParameters>) -> Self {
        Self {
            params: params.into(),
            rpc_url: None,
            http: HttpClientConfig::default(),
        }
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// The endpoint this configuration resolves to.
    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.params.default_rpc_url())
    }
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("building transport: {0}")]
    Transport(#[from] TransportError),

    #[error("verifying endpoint: {0}")]
    Client(#[from] ClientError),
}

/// Wrap `transport` in the client for `params`' family without contacting
/// the node.
pub fn client_for(params: ChainParameters, transport: Arc<dyn RpcTransport>) -> Arc<dyn AccountClient> {
    match params {
        ChainParameters::Utxo(p) => Arc::new(UtxoClient::new(transport, p)),
        ChainParameters::Evm(p) => Arc::new(EvmClient::new(transport, p)),
        ChainParameters::Solana(p) => Arc::new(SolanaClient::new(transport, p)),
    }
}

/// Build the HTTP transport and family client for `config`.
///
/// EVM endpoints are asked for their chain id and rejected with
/// [`ClientError::ChainMismatch`] if it differs from the configured one.
pub async fn connect(ctx: &Context, config: &NetworkConfig) -> Result<Arc<dyn AccountClient>, ConnectError> {
    let url = config.rpc_url();
    let transport: Arc<dyn RpcTransport> = Arc::new(HttpRpcClient::new(url, config.http.clone())?);
    tracing::info!(network = %config.params, url, "connecting");

    let client = match config.params {
        ChainParameters::Evm(p) => {
            let client: Arc<dyn AccountClient> = Arc::new(EvmClient::connect(ctx, transport, p).await?);
            client
        }
        params => client_for(params, transport),
    };
    Ok(client)
}

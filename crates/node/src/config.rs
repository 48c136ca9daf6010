use std::time::Duration;

use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use clap::Args;

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for [`AlloyEthClient`](crate::AlloyEthClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: Url,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(rpc_url: &str, request_timeout: Duration) -> Result<Self> {
        let rpc_url = rpc_url.parse().with_context(|| format!("invalid RPC URL: {rpc_url}"))?;
        Ok(Self { rpc_url, request_timeout })
    }
}

#[derive(Args, Debug, Clone)]
pub struct RpcArgs {
    /// Ethereum node HTTP RPC URL
    #[arg(long, env = "NODE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "NODE_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
}

impl RpcArgs {
    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::new(&self.rpc_url, Duration::from_millis(self.request_timeout_ms))
    }
}

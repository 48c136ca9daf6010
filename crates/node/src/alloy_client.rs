use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, BlockHash, BlockNumber, B256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{Filter, Header, Log};
use alloy::transports::http::{reqwest, Http};
use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use crate::client::{ClientError, EthClient};
use crate::config::ClientConfig;

/// [`EthClient`] backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct AlloyEthClient {
    provider: RootProvider,
}

impl AlloyEthClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        let http = Http::with_client(http_client, config.rpc_url.clone());
        let rpc_client = RpcClient::new(http, false);
        Ok(Self { provider: RootProvider::new(rpc_client) })
    }

    async fn get_header(&self, number: BlockNumberOrTag) -> Result<Option<Header>, ClientError> {
        let block = self.provider.get_block_by_number(number).await.map_err(ClientError::rpc)?;
        Ok(block.map(|b| b.header))
    }
}

#[async_trait]
impl EthClient for AlloyEthClient {
    async fn header_by_number(&self, number: BlockNumber) -> Result<Header, ClientError> {
        debug!(number, "fetching header by number");
        self.get_header(BlockNumberOrTag::Number(number))
            .await?
            .ok_or(ClientError::HeaderNotFound { number })
    }

    async fn finalized_block_height(&self) -> Result<BlockNumber, ClientError> {
        debug!("fetching finalized block");
        let header = self
            .get_header(BlockNumberOrTag::Finalized)
            .await?
            .ok_or(ClientError::FinalizedUnavailable)?;
        Ok(header.number)
    }

    async fn headers_by_range(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<Header>, ClientError> {
        if from > to {
            return Err(ClientError::InvalidRange { from, to });
        }
        debug!(from, to, "fetching header range");

        let mut headers = Vec::with_capacity((to - from).saturating_add(1).min(1024) as usize);
        for number in from..=to {
            headers.push(self.header_by_number(number).await?);
        }
        Ok(headers)
    }

    async fn header_by_hash(&self, hash: BlockHash) -> Result<Header, ClientError> {
        debug!(%hash, "fetching header by hash");
        let block = self.provider.get_block_by_hash(hash).await.map_err(ClientError::rpc)?;
        block.map(|b| b.header).ok_or(ClientError::HeaderNotFoundByHash { hash })
    }

    async fn storage_hash(
        &self,
        address: Address,
        block_number: BlockNumber,
    ) -> Result<B256, ClientError> {
        debug!(%address, block_number, "fetching storage hash");
        let proof = self
            .provider
            .get_proof(address, vec![])
            .block_id(BlockId::number(block_number))
            .await
            .map_err(ClientError::rpc)?;
        Ok(proof.storage_hash)
    }

    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError> {
        debug!(?filter, "fetching logs");
        let logs = self.provider.get_logs(filter).await.map_err(ClientError::rpc)?;
        debug!(count = logs.len(), "fetched logs");
        Ok(logs)
    }
}

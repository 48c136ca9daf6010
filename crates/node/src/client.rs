//! The Ethereum client capability set consumed by the indexer.

use alloy::primitives::{Address, BlockHash, BlockNumber, B256};
use alloy::rpc::types::{Filter, Header, Log};
use async_trait::async_trait;
use derive_more::{Display, Error};

/// Errors returned by an [`EthClient`].
///
/// Variants only carry owned, cloneable data so a test double can hand the
/// same error back more than once.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ClientError {
    /// Transport or JSON-RPC failure.
    #[display("rpc error: {message}")]
    Rpc { message: String },
    #[display("header for block {number} not found")]
    HeaderNotFound { number: BlockNumber },
    #[display("header for block hash {hash} not found")]
    HeaderNotFoundByHash { hash: BlockHash },
    #[display("finalized block not available")]
    FinalizedUnavailable,
    #[display("invalid block range {from}..={to}")]
    InvalidRange { from: BlockNumber, to: BlockNumber },
    /// Free-form "not found", for lookups without a dedicated variant.
    #[display("{what} not found")]
    NotFound { what: String },
}

impl ClientError {
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc { message: err.to_string() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

#[async_trait]
pub trait EthClient: Send + Sync {
    /// Get the header of block `number`.
    async fn header_by_number(&self, number: BlockNumber) -> Result<Header, ClientError>;

    /// Get the number of the latest finalized block.
    async fn finalized_block_height(&self) -> Result<BlockNumber, ClientError>;

    /// Get the headers of blocks `from..=to`, in ascending order.
    async fn headers_by_range(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<Header>, ClientError>;

    /// Get a block header by its hash.
    async fn header_by_hash(&self, hash: BlockHash) -> Result<Header, ClientError>;

    /// Get the storage trie root of `address` as of block `block_number`.
    async fn storage_hash(
        &self,
        address: Address,
        block_number: BlockNumber,
    ) -> Result<B256, ClientError>;

    /// Get the logs matching `filter`.
    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            ClientError::HeaderNotFound { number: 7 }.to_string(),
            "header for block 7 not found"
        );
        assert_eq!(
            ClientError::InvalidRange { from: 10, to: 3 }.to_string(),
            "invalid block range 10..=3"
        );
        assert_eq!(ClientError::not_found("receipt").to_string(), "receipt not found");
        assert_eq!(
            ClientError::rpc("connection refused").to_string(),
            "rpc error: connection refused"
        );
    }
}

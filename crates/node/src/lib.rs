//! Ethereum client capability set for the indexer, its alloy-backed
//! implementation, and a programmable test double.

mod alloy_client;
mod client;
pub mod config;
pub mod logging;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use alloy_client::AlloyEthClient;
pub use client::{ClientError, EthClient};
pub use config::{ClientConfig, RpcArgs};
pub use logging::{init_logging, LogArgs, LogFormat};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{EthCall, EthMethod, MockEthClient};

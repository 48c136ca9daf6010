//! node-probe - query an Ethereum node through the indexer's client.
//!
//! Subcommands:
//! - `finalized` - latest finalized block number
//! - `header` - one header, by number or hash
//! - `headers` - headers of an inclusive block range
//! - `storage-hash` - storage root of an account at a block
//! - `logs` - logs matching an address/topic/block-range filter

use alloy::primitives::{Address, BlockHash, BlockNumber, B256};
use alloy::rpc::types::Filter;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use indexer_node::{init_logging, AlloyEthClient, EthClient, LogArgs, RpcArgs};

#[derive(Parser, Debug)]
#[command(
    name = "node-probe",
    author,
    version,
    about = "Query an Ethereum node through the indexer client"
)]
struct Cli {
    #[command(flatten)]
    rpc: RpcArgs,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the latest finalized block number
    Finalized,
    /// Print a block header
    Header(HeaderArgs),
    /// Print the headers of blocks FROM..=TO
    Headers {
        #[arg(long)]
        from: BlockNumber,
        #[arg(long)]
        to: BlockNumber,
    },
    /// Print the storage root of an account
    StorageHash {
        #[arg(long)]
        address: Address,
        #[arg(long)]
        block: BlockNumber,
    },
    /// Print logs matching a filter
    Logs(LogsArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct HeaderArgs {
    /// Block number
    #[arg(long)]
    number: Option<BlockNumber>,

    /// Block hash
    #[arg(long)]
    hash: Option<BlockHash>,
}

#[derive(Args, Debug)]
struct LogsArgs {
    /// Emitting contract; repeat for several
    #[arg(long)]
    address: Vec<Address>,

    /// First topic (event signature hash)
    #[arg(long)]
    topic0: Option<B256>,

    #[arg(long)]
    from: BlockNumber,

    #[arg(long)]
    to: BlockNumber,
}

impl LogsArgs {
    fn filter(&self) -> Filter {
        let mut filter =
            Filter::new().address(self.address.clone()).from_block(self.from).to_block(self.to);
        if let Some(topic) = self.topic0 {
            filter = filter.event_signature(topic);
        }
        filter
    }
}

#[derive(Serialize)]
struct Finalized {
    finalized: BlockNumber,
}

#[derive(Serialize)]
struct StorageHash {
    address: Address,
    block: BlockNumber,
    storage_hash: B256,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

async fn run(command: Command, client: &impl EthClient) -> Result<()> {
    match command {
        Command::Finalized => {
            let finalized = client.finalized_block_height().await?;
            print_json(&Finalized { finalized })
        }
        Command::Header(HeaderArgs { number: Some(number), .. }) => {
            print_json(&client.header_by_number(number).await?)
        }
        Command::Header(HeaderArgs { hash: Some(hash), .. }) => {
            print_json(&client.header_by_hash(hash).await?)
        }
        Command::Header(_) => anyhow::bail!("either --number or --hash is required"),
        Command::Headers { from, to } => {
            let headers = client
                .headers_by_range(from, to)
                .await
                .with_context(|| format!("failed to fetch headers {from}..={to}"))?;
            info!(count = headers.len(), "fetched headers");
            print_json(&headers)
        }
        Command::StorageHash { address, block } => {
            let storage_hash = client.storage_hash(address, block).await?;
            print_json(&StorageHash { address, block, storage_hash })
        }
        Command::Logs(args) => {
            let logs = client.filter_logs(&args.filter()).await?;
            info!(count = logs.len(), "fetched logs");
            print_json(&logs)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log);

    let config = cli.rpc.client_config()?;
    info!(rpc_url = %config.rpc_url, "connecting");
    let client = AlloyEthClient::new(&config)?;

    run(cli.command, &client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy::primitives::b256;
    use clap::error::ErrorKind;

    const HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

    #[test]
    fn header_requires_exactly_one_selector() {
        let err = Cli::try_parse_from(["node-probe", "header"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["node-probe", "header", "--number", "1", "--hash", HASH])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["node-probe", "header", "--number", "12"]).unwrap();
        assert!(matches!(cli.command, Command::Header(HeaderArgs { number: Some(12), hash: None })));
    }

    #[test]
    fn header_accepts_full_hash() {
        let cli = Cli::try_parse_from(["node-probe", "header", "--hash", HASH]).unwrap();
        let Command::Header(args) = cli.command else { panic!("expected header command") };
        assert_eq!(args.number, None);
        assert_eq!(
            args.hash,
            Some(b256!("0x00000000000000000000000000000000000000000000000000000000000000aa"))
        );
    }

    #[test]
    fn logs_args_build_filter() {
        let cli = Cli::try_parse_from([
            "node-probe",
            "logs",
            "--address",
            "0x00000000000000000000000000000000000000c0",
            "--from",
            "100",
            "--to",
            "200",
        ])
        .unwrap();
        let Command::Logs(args) = cli.command else { panic!("expected logs command") };
        let filter = args.filter();
        assert_eq!(filter.get_from_block(), Some(100));
        assert_eq!(filter.get_to_block(), Some(200));
        assert_eq!(filter.address.len(), 1);
    }
}

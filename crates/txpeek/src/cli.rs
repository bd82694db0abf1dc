use std::path::PathBuf;
use std::str::FromStr;

use bitcoin::Network;
use clap::{Parser, Subcommand, ValueEnum};

/// txpeek — look up a Bitcoin transaction's status and fee rate on a block explorer.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Explorer base URL. Overrides --network.
    #[arg(long, global = true, env = "TXPEEK_API_BASE")]
    pub api_base: Option<String>,

    /// Network whose public mempool.space instance to query.
    #[arg(
        long,
        global = true,
        default_value = "bitcoin",
        value_parser = parse_network,
        env = "TXPEEK_NETWORK"
    )]
    pub network: Network,

    /// Where lookup results are persisted.
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::None, env = "TXPEEK_STORE")]
    pub store: StoreKind,

    /// Directory for the `jsonl` store.
    #[arg(long, global = true, default_value = "txpeek-data", env = "TXPEEK_STORE_DIR")]
    pub store_dir: PathBuf,

    /// Explorer connect timeout in seconds.
    #[arg(long, global = true, default_value = "10", env = "TXPEEK_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: u64,

    /// Explorer request timeout in seconds. Unset means wait indefinitely.
    #[arg(long, global = true, env = "TXPEEK_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the lookup API.
    Serve {
        /// Address to bind the web server to.
        #[arg(long, default_value = "127.0.0.1", env = "TXPEEK_BIND")]
        bind: String,

        /// Port to listen on.
        #[arg(long, default_value = "3090", env = "TXPEEK_PORT")]
        port: u16,
    },
    /// Look up one transaction and print the result.
    Lookup {
        /// Transaction id (64 characters).
        txid: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    None,
    Memory,
    Jsonl,
}

fn parse_network(s: &str) -> Result<Network, String> {
    Network::from_str(s).map_err(|e| e.to_string())
}

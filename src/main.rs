//! Pool Gas Tracker CLI
//!
//! Computes average per-method gas costs for pool contracts from
//! historic call traces and maintains a persisted gas-table cache.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use pool_gas_tracker::commands::{
    execute_pool, execute_scan, execute_tx, PoolArgs, ScanArgs, TxArgs,
};
use pool_gas_tracker::utils::config::{DEFAULT_CACHE_FILE, DEFAULT_REGISTRIES};

/// Pool Gas Tracker - historic gas costs for pool contract methods
#[derive(Parser, Debug)]
#[command(name = "pool-gas")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute gas tables for every pool listed in the registries
    Scan {
        /// RPC endpoint URL
        #[arg(short, long, env = "POOL_GAS_RPC", default_value = "http://localhost:8545")]
        rpc: String,

        /// Registry contract address (repeatable; defaults to the mainnet
        /// stableswap registry and factory)
        #[arg(short = 'g', long = "registry")]
        registries: Vec<String>,

        /// Minimum number of transactions backing a merged table
        #[arg(short, long, default_value_t = 500)]
        min_transactions: usize,

        /// Path of the persisted gas-table cache
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        cache: PathBuf,
    },

    /// Compute the gas table for one pool over an explicit block range
    Pool {
        /// RPC endpoint URL
        #[arg(short, long, env = "POOL_GAS_RPC", default_value = "http://localhost:8545")]
        rpc: String,

        /// Pool contract address
        #[arg(short, long)]
        address: String,

        /// Start block (inclusive)
        #[arg(short, long)]
        start_block: u64,

        /// End block (inclusive)
        #[arg(short, long)]
        end_block: u64,

        /// Path of the persisted gas-table cache
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        cache: PathBuf,
    },

    /// Inspect one transaction: call tree and per-method gas breakdown
    Tx {
        /// RPC endpoint URL
        #[arg(short, long, env = "POOL_GAS_RPC", default_value = "http://localhost:8545")]
        rpc: String,

        /// Contract address the breakdown is scoped to
        #[arg(short, long)]
        address: String,

        /// Transaction hash
        #[arg(short, long)]
        tx: String,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Scan {
            rpc,
            registries,
            min_transactions,
            cache,
        } => {
            let registries = if registries.is_empty() {
                DEFAULT_REGISTRIES.iter().map(|r| r.to_string()).collect()
            } else {
                registries
            };

            execute_scan(ScanArgs {
                rpc_url: rpc,
                registries,
                min_transactions,
                cache_path: cache,
            })
        }

        Commands::Pool {
            rpc,
            address,
            start_block,
            end_block,
            cache,
        } => execute_pool(PoolArgs {
            rpc_url: rpc,
            address,
            start_block,
            end_block,
            cache_path: cache,
        }),

        Commands::Tx { rpc, address, tx } => execute_tx(TxArgs {
            rpc_url: rpc,
            address,
            tx_hash: tx,
        }),
    }
}

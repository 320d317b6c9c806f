//! Single-pool command: gas table for one contract over a block range.

use crate::cache::GasCacheStore;
use crate::pipeline::gas_table_for_transactions;
use crate::rpc::{RpcClient, TransactionScanner};
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Arguments for the pool command
#[derive(Debug, Clone)]
pub struct PoolArgs {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Pool contract address
    pub address: String,

    /// First block of the range (inclusive)
    pub start_block: u64,

    /// Last block of the range (inclusive)
    pub end_block: u64,

    /// Path of the persisted gas-table cache
    pub cache_path: PathBuf,
}

/// Execute the pool command
///
/// **Public** - main entry point called from main.rs
///
/// Single-contract mode: errors are terminal, there is no batch of other
/// pools to fall back to.
pub fn execute_pool(args: PoolArgs) -> Result<()> {
    super::validate_address(&args.address)?;
    if args.start_block > args.end_block {
        anyhow::bail!("start block is past end block");
    }

    let client = RpcClient::new(&args.rpc_url).context("Failed to create RPC client")?;
    let store = GasCacheStore::new(&args.cache_path);

    info!(
        "Getting transactions for pool {} in range {} - {} ...",
        args.address, args.start_block, args.end_block
    );
    let txes = client
        .transactions_in_range(&args.address, args.start_block, args.end_block)
        .context("Failed to fetch event logs")?;
    if txes.is_empty() {
        info!("No transactions found. No gas stats saved.");
        return Ok(());
    }
    info!("Found {} transactions. Fetching gas costs ...", txes.len());

    let result = gas_table_for_transactions(&client, &args.address, &txes);
    info!(
        "{} traces processed, {} skipped",
        result.processed,
        result.skipped()
    );

    if result.table.is_empty() {
        info!("No attributable samples. No gas stats saved.");
        return Ok(());
    }

    let replaced = store
        .merge_entry(&args.address, &result.table)
        .context("Failed to merge gas table into cache")?;
    if replaced {
        info!("... saved!");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&result.table).context("Failed to render gas table")?
    );

    Ok(())
}

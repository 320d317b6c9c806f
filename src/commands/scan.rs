//! Registry scan command.
//!
//! The scan command:
//! 1. Resolves pool addresses from the configured registries
//! 2. Per pool, harvests transactions backwards from the chain head
//! 3. Runs the pipeline over the harvested batch
//! 4. Merges the resulting gas table unless the evidence is below threshold
//!
//! One pool's failure never stops the scan of the remaining pools.

use crate::cache::GasCacheStore;
use crate::pipeline::gas_table_for_transactions;
use crate::rpc::{OnchainRegistry, PoolRegistry, RpcClient, TransactionScanner};
use crate::utils::config::{BLOCK_WINDOW, MAX_EMPTY_WINDOWS};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Debug, Clone)]
pub struct ScanArgs {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Registry contracts to resolve pools from
    pub registries: Vec<String>,

    /// Minimum number of transactions backing a merged table
    pub min_transactions: usize,

    /// Path of the persisted gas-table cache
    pub cache_path: PathBuf,
}

/// Execute the scan command
///
/// **Public** - main entry point called from main.rs
///
/// Fatal errors: no pools resolved, or the RPC client cannot be built.
/// Per-pool errors are logged and skipped.
pub fn execute_scan(args: ScanArgs) -> Result<()> {
    let client = RpcClient::new(&args.rpc_url).context("Failed to create RPC client")?;
    let registry = OnchainRegistry::new(&client, args.registries.clone());
    let store = GasCacheStore::new(&args.cache_path);

    info!("Resolving pools from {} registries ...", args.registries.len());
    let pools = registry
        .pool_addresses()
        .context("Failed to resolve pool addresses")?;
    if pools.is_empty() {
        anyhow::bail!("no pools resolved from any registry");
    }
    info!("... found {} pools.", pools.len());

    for pool in &pools {
        if let Err(e) = scan_pool(&client, &store, pool, args.min_transactions) {
            warn!("Error getting gas costs for {}: {:#}. Moving on ...", pool, e);
        }
    }

    Ok(())
}

/// Scan one pool end to end
///
/// **Private** - per-pool unit of work, errors stay inside the scan loop
fn scan_pool(
    client: &RpcClient,
    store: &GasCacheStore,
    pool: &str,
    min_transactions: usize,
) -> Result<()> {
    let head = client.head_block().context("Failed to fetch head block")?;

    info!("Getting transactions for pool {}.", pool);
    let txes = harvest_transactions(client, pool, head, min_transactions)?;
    if txes.is_empty() {
        info!("No transactions found for {}. Moving on.", pool);
        return Ok(());
    }
    info!("Found {} transactions. Fetching gas costs ...", txes.len());

    let result = gas_table_for_transactions(client, pool, &txes);
    info!(
        "{}: {} traces processed, {} skipped",
        pool,
        result.processed,
        result.skipped()
    );

    if result.table.is_empty() {
        info!("No attributable samples for {}. Nothing to merge.", pool);
        return Ok(());
    }

    if (result.table.count as usize) < min_transactions {
        info!(
            "Only {} of the required {} transactions for {}. Skipping merge.",
            result.table.count, min_transactions, pool
        );
        return Ok(());
    }

    let replaced = store
        .merge_entry(pool, &result.table)
        .context("Failed to merge gas table into cache")?;
    if replaced {
        info!("... saved!");
    }

    Ok(())
}

/// Collect transactions walking back from the head in fixed windows
///
/// **Private** - stops at the target count, the empty-window budget, or
/// genesis, whichever comes first
fn harvest_transactions(
    scanner: &impl TransactionScanner,
    pool: &str,
    head: u64,
    min_transactions: usize,
) -> Result<Vec<String>> {
    let mut txes: Vec<String> = Vec::new();
    let mut empty_windows = 0;
    let mut end = head;

    while txes.len() < min_transactions && empty_windows < MAX_EMPTY_WINDOWS && end > 0 {
        let start = end.saturating_sub(BLOCK_WINDOW);

        let found = scanner
            .transactions_in_range(pool, start, end)
            .context("Failed to fetch event logs")?;
        let fresh: Vec<String> = found.into_iter().filter(|tx| !txes.contains(tx)).collect();

        if fresh.is_empty() {
            debug!("no transactions found in {}:{}", start, end);
            empty_windows += 1;
        } else {
            empty_windows = 0;
            info!(
                "Found {} txes between blocks {}:{}. Total: {}",
                fresh.len(),
                start,
                end,
                txes.len() + fresh.len()
            );
            txes.extend(fresh);
        }

        end = start;
    }

    Ok(txes)
}

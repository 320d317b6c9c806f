//! Transaction diagnostic command.
//!
//! Read-only: prints the call tree and the per-method gas breakdown for
//! one transaction, scoped to one contract. The persisted cache is never
//! touched.

use crate::aggregator::{collect_samples, reduce_samples};
use crate::parser::{build_call_tree, call_tree::normalize_address, render_tree};
use crate::rpc::{RpcClient, TraceSource};
use anyhow::{Context, Result};
use std::collections::BTreeSet;

/// Arguments for the tx command
#[derive(Debug, Clone)]
pub struct TxArgs {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Contract address the breakdown is scoped to
    pub address: String,

    /// Transaction hash to inspect
    pub tx_hash: String,
}

/// Execute the tx command
///
/// **Public** - main entry point called from main.rs
pub fn execute_tx(args: TxArgs) -> Result<()> {
    super::validate_address(&args.address)?;
    super::validate_tx_hash(&args.tx_hash)?;

    let client = RpcClient::new(&args.rpc_url).context("Failed to create RPC client")?;

    let raw = client
        .trace(&args.tx_hash)
        .context(format!("Failed to fetch trace for {}", args.tx_hash))?;

    let targets: BTreeSet<String> = [normalize_address(&args.address)].into();
    let tree = build_call_tree(&args.tx_hash, &raw, &targets)
        .context("Failed to parse trace into a call tree")?;

    println!("Call trace for '{}':", args.tx_hash);
    print!("{}", render_tree(&tree));

    let table = reduce_samples(&collect_samples(&tree), 1);
    println!("\nGas consumed per method for '{}':", args.address);
    println!(
        "{}",
        serde_json::to_string_pretty(&table).context("Failed to render gas table")?
    );

    Ok(())
}

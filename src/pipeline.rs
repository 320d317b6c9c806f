//! Batch pipeline: transaction hashes in, gas table out.
//!
//! Drives fetch, tree construction, attribution, and reduction for one
//! contract. Failures are scoped to the transaction that caused them: a
//! trace that cannot be fetched or parsed is counted and skipped, the
//! rest of the batch continues.

use crate::aggregator::{collect_samples, reduce_samples, GasSample, GasTable};
use crate::parser::{build_call_tree, call_tree::normalize_address};
use crate::rpc::TraceSource;
use log::{info, warn};
use std::collections::BTreeSet;

/// Outcome of one batch run
#[derive(Debug)]
pub struct BatchResult {
    /// Reduced statistics; empty when nothing was attributable
    pub table: GasTable,

    /// Transactions whose trace was fetched and parsed
    pub processed: usize,

    /// Transactions skipped because the trace was malformed
    pub skipped_malformed: usize,

    /// Transactions skipped because the trace could not be fetched
    pub skipped_fetch: usize,
}

impl BatchResult {
    pub fn skipped(&self) -> usize {
        self.skipped_malformed + self.skipped_fetch
    }
}

/// Compute the gas table for one contract over a transaction batch
///
/// **Public** - main pipeline entry point
///
/// The reducer's transaction count is the number of transactions that
/// contributed at least one sample, so a batch where nothing matched
/// reduces to an empty table and the caller skips the merge.
pub fn gas_table_for_transactions(
    source: &dyn TraceSource,
    address: &str,
    tx_hashes: &[String],
) -> BatchResult {
    let targets: BTreeSet<String> = [normalize_address(address)].into();

    let mut samples: Vec<GasSample> = Vec::new();
    let mut contributing: u64 = 0;
    let mut processed = 0;
    let mut skipped_malformed = 0;
    let mut skipped_fetch = 0;

    for tx_hash in tx_hashes {
        let raw = match source.trace(tx_hash) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not fetch trace for {}: {}. Moving on.", tx_hash, e);
                skipped_fetch += 1;
                continue;
            }
        };

        let tree = match build_call_tree(tx_hash, &raw, &targets) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("skipping {}: {}", tx_hash, e);
                skipped_malformed += 1;
                continue;
            }
        };
        processed += 1;

        let tx_samples = collect_samples(&tree);
        if !tx_samples.is_empty() {
            contributing += 1;
            samples.extend(tx_samples);
        }
    }

    info!(
        "batch for {}: {} processed, {} malformed, {} fetch failures, {} contributing",
        address, processed, skipped_malformed, skipped_fetch, contributing
    );

    BatchResult {
        table: reduce_samples(&samples, contributing),
        processed,
        skipped_malformed,
        skipped_fetch,
    }
}

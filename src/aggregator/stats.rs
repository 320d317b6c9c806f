//! Statistics reduction: fold gas samples into a per-method gas table.

use super::attribution::GasSample;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average gas and sample count for one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStats {
    /// Arithmetic mean over all raw samples for this method
    pub avg_gas: f64,

    /// Number of samples behind the mean (never zero; a method with no
    /// samples has no entry)
    pub count: u64,
}

/// Per-method gas statistics for one contract.
///
/// Serializes to the flat cache shape: method keys at the top level next
/// to the reserved `count` key holding the transaction-sample count.
/// Method keys are `0x`-prefixed selectors so they cannot collide with
/// `count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasTable {
    #[serde(flatten)]
    pub methods: BTreeMap<String, MethodStats>,

    /// Number of transactions that contributed at least one sample
    pub count: u64,
}

impl GasTable {
    /// A table with no evidence at all.
    ///
    /// Empty tables signal "nothing new to contribute" and must never be
    /// merged into the persisted cache.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Reduce a batch of samples into a gas table
///
/// **Public** - main entry point for reduction
///
/// # Arguments
/// * `samples` - All samples collected across the batch, any order
/// * `tx_count` - Transactions that contributed at least one sample
///
/// Pure and deterministic: the mean is commutative, so permuting the
/// input changes nothing. Each sample is one data point; a method called
/// twice in one transaction weighs twice.
pub fn reduce_samples(samples: &[GasSample], tx_count: u64) -> GasTable {
    let mut sums: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for sample in samples {
        let entry = sums.entry(sample.method.clone()).or_insert((0, 0));
        entry.0 += sample.gas;
        entry.1 += 1;
    }

    let methods = sums
        .into_iter()
        .map(|(method, (total, n))| {
            let stats = MethodStats {
                avg_gas: total as f64 / n as f64,
                count: n,
            };
            (method, stats)
        })
        .collect::<BTreeMap<_, _>>();

    debug!(
        "reduced {} samples into {} methods across {} transactions",
        samples.len(),
        methods.len(),
        tx_count
    );

    GasTable {
        methods,
        count: tx_count,
    }
}

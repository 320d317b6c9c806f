//! Gas attribution: walk a call tree and emit per-method gas samples.
//!
//! A frame produces a sample when its address is in the tree's target set
//! and its kind is attributable. The sample carries the frame's full
//! subtree gas: callers care about the total cost of invoking a method,
//! including its callees.

use crate::parser::{CallFrame, CallTree};
use log::debug;

/// One observed invocation cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSample {
    /// Contract the invocation targeted (lowercased hex)
    pub address: String,

    /// Method identifier (selector hex, possibly opaque)
    pub method: String,

    /// Gas of the invocation including descendants
    pub gas: u64,
}

/// Collect gas samples from one call tree
///
/// **Public** - main entry point for attribution
///
/// Every attributable occurrence yields its own sample: a method invoked
/// three times in one transaction contributes three data points. No
/// deduplication, no I/O, no failure modes.
pub fn collect_samples(tree: &CallTree) -> Vec<GasSample> {
    let mut samples = Vec::new();
    walk(&tree.root, tree, &mut samples);
    debug!(
        "{}: collected {} samples from {} frames",
        tree.tx_hash,
        samples.len(),
        tree.root.frame_count()
    );
    samples
}

/// Depth-first walk in execution order
///
/// **Private** - recursive worker for collect_samples
fn walk(frame: &CallFrame, tree: &CallTree, out: &mut Vec<GasSample>) {
    if frame.kind.is_attributable() && tree.targets.contains(&frame.address) {
        out.push(GasSample {
            address: frame.address.clone(),
            method: frame.method.clone(),
            gas: frame.gas_used,
        });
    }
    for child in &frame.children {
        walk(child, tree, out);
    }
}

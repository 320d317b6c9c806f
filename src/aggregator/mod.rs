//! Gas attribution and statistics reduction.
//!
//! `attribution` turns call trees into per-method gas samples;
//! `stats` reduces a batch of samples into a gas table.

pub mod attribution;
pub mod stats;

// Re-export main types
pub use attribution::{collect_samples, GasSample};
pub use stats::{reduce_samples, GasTable, MethodStats};

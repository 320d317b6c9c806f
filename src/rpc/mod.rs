//! Chain collaborators: capability traits and their JSON-RPC implementation.
//!
//! The pipeline never talks to the network directly; it consumes these
//! traits, so tests can drive it with synthetic traces.

pub mod client;
pub mod types;

use crate::utils::error::RpcError;

/// Fetch the raw execution trace of one transaction
pub trait TraceSource {
    fn trace(&self, tx_hash: &str) -> Result<serde_json::Value, RpcError>;
}

/// List the pool contracts under measurement
pub trait PoolRegistry {
    fn pool_addresses(&self) -> Result<Vec<String>, RpcError>;
}

/// Discover transactions touching a contract
pub trait TransactionScanner {
    fn head_block(&self) -> Result<u64, RpcError>;

    fn transactions_in_range(
        &self,
        address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<String>, RpcError>;
}

// Re-export main types
pub use client::{OnchainRegistry, RpcClient};

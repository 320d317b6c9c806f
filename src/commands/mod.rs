//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod pool;
pub mod scan;
pub mod tx;

// Re-export main command functions
pub use pool::{execute_pool, PoolArgs};
pub use scan::{execute_scan, ScanArgs};
pub use tx::{execute_tx, TxArgs};

use anyhow::Result;

/// Validate a 20-byte hex address argument
pub fn validate_address(address: &str) -> Result<()> {
    let hex = address.strip_prefix("0x").unwrap_or(address);

    if hex.len() != 40 {
        anyhow::bail!("address must be 20 bytes (40 hex characters)");
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("address contains invalid characters");
    }

    Ok(())
}

/// Validate a 32-byte transaction hash argument
pub fn validate_tx_hash(tx_hash: &str) -> Result<()> {
    let hex = tx_hash.strip_prefix("0x").unwrap_or(tx_hash);

    if hex.len() != 64 {
        anyhow::bail!("transaction hash must be 32 bytes (64 hex characters)");
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("transaction hash contains invalid characters");
    }

    Ok(())
}

//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default timeout for RPC requests
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default path of the persisted gas-table cache
pub const DEFAULT_CACHE_FILE: &str = "pool_gas_estimates.json";

/// Registries scanned when none are given on the command line.
/// Mainnet stableswap registry and factory.
pub const DEFAULT_REGISTRIES: &[&str] = &[
    "0x90E00ACe148ca3b23Ac1bC8C240C2a7Dd9c2d7f5",
    "0xB9fC157394Af804a3578134A6585C0dc9cc990d4",
];

// 4-byte selectors of the registry getters we call via eth_call
pub const POOL_COUNT_SELECTOR: &str = "0x956aae3a"; // pool_count()
pub const POOL_LIST_SELECTOR: &str = "0x3a1d5d8e"; // pool_list(uint256)

/// How many blocks one backwards scan window covers
pub const BLOCK_WINDOW: u64 = 20_000;

/// Consecutive empty windows tolerated before a pool scan gives up
pub const MAX_EMPTY_WINDOWS: usize = 10;

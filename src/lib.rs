//! Pool Gas Tracker
//!
//! Derives per-method gas-cost statistics for pool contracts from
//! historic transaction call traces and keeps the results in an
//! incrementally updated cache file keyed by contract address.
//!
//! This crate provides the core implementation for the `pool-gas`
//! CLI tool.

pub mod aggregator;
pub mod cache;
pub mod commands;
pub mod parser;
pub mod pipeline;
pub mod rpc;
pub mod utils;

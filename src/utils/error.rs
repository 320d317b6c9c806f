//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur during RPC communication
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("RPC method not supported by this endpoint")]
    MethodNotSupported,
}

/// Errors that can occur while building a call tree from a raw trace.
///
/// Scoped to a single transaction: a malformed trace skips that
/// transaction, the rest of the batch continues.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("malformed trace: frame is missing a contract address")]
    MissingAddress,

    #[error("malformed trace: frame is missing a gas value")]
    MissingGas,

    #[error("malformed trace: invalid gas value: {0}")]
    InvalidGas(String),

    #[error("malformed trace: unknown call kind tag: {0:?}")]
    UnknownCallKind(String),

    #[error("malformed trace: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur reading or writing the persisted gas-table cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

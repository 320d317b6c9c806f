//! HTTP client for communicating with an Ethereum node RPC endpoint.

use super::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use super::{PoolRegistry, TraceSource, TransactionScanner};
use crate::utils::config::{DEFAULT_RPC_TIMEOUT, POOL_COUNT_SELECTOR, POOL_LIST_SELECTOR};
use crate::utils::error::RpcError;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// RPC client for trace fetching and transaction discovery
pub struct RpcClient {
    client: Client,
    rpc_url: String,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(DEFAULT_RPC_TIMEOUT)
            .build()
            .map_err(RpcError::RequestFailed)?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    /// Issue one JSON-RPC call and unwrap the response envelope
    ///
    /// **Private** - shared plumbing for the trait implementations
    fn call<T: DeserializeOwned + Default>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = JsonRpcRequest::new(method, params);

        debug!("RPC request: {:?}", request);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .map_err(RpcError::RequestFailed)?;

        if !response.status().is_success() {
            return Err(RpcError::InvalidResponse(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().unwrap_or_default()
            )));
        }

        let rpc_response: JsonRpcResponse<T> =
            response.json().map_err(RpcError::RequestFailed)?;

        if let Some(error) = rpc_response.error {
            return Err(map_rpc_error(error));
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("Missing result field".to_string()))
    }

    /// Read-only contract call against the latest block
    pub fn eth_call(&self, to: &str, data: &str) -> Result<String, RpcError> {
        self.call(
            "eth_call",
            serde_json::json!([{ "to": to, "data": data }, "latest"]),
        )
    }
}

impl TraceSource for RpcClient {
    fn trace(&self, tx_hash: &str) -> Result<serde_json::Value, RpcError> {
        let tx_hash = normalize_tx_hash(tx_hash);

        info!("Fetching call trace for transaction: {}", tx_hash);

        let params = serde_json::json!([tx_hash, { "tracer": "callTracer" }]);
        match self.call("debug_traceTransaction", params) {
            Err(RpcError::InvalidResponse(message))
                if message.to_lowercase().contains("not found") =>
            {
                Err(RpcError::TransactionNotFound(tx_hash))
            }
            other => other,
        }
    }
}

impl TransactionScanner for RpcClient {
    fn head_block(&self) -> Result<u64, RpcError> {
        let head: String = self.call("eth_blockNumber", serde_json::json!([]))?;
        parse_hex_u64(&head)
    }

    /// Transactions that emitted an event from `address` in the range.
    /// Pool activity always emits events, so logs are a cheap index;
    /// duplicates (several events per transaction) collapse to one hash.
    fn transactions_in_range(
        &self,
        address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<String>, RpcError> {
        #[derive(Debug, Deserialize)]
        struct LogEntry {
            #[serde(rename = "transactionHash")]
            transaction_hash: String,
        }

        let params = serde_json::json!([{
            "fromBlock": to_hex(from_block),
            "toBlock": to_hex(to_block),
            "address": address,
        }]);
        let logs: Vec<LogEntry> = self.call("eth_getLogs", params)?;

        let mut txes: Vec<String> = Vec::new();
        for log in logs {
            let tx = log.transaction_hash.to_ascii_lowercase();
            if !txes.contains(&tx) {
                txes.push(tx);
            }
        }

        debug!(
            "{} transactions for {} in blocks {}..{}",
            txes.len(),
            address,
            from_block,
            to_block
        );

        Ok(txes)
    }
}

/// Pool discovery over one or more on-chain registries.
///
/// Walks each registry's `pool_count()` / `pool_list(uint256)` getters
/// via `eth_call` and deduplicates across registries.
pub struct OnchainRegistry<'a> {
    client: &'a RpcClient,
    registries: Vec<String>,
}

impl<'a> OnchainRegistry<'a> {
    pub fn new(client: &'a RpcClient, registries: Vec<String>) -> Self {
        Self { client, registries }
    }
}

impl PoolRegistry for OnchainRegistry<'_> {
    fn pool_addresses(&self) -> Result<Vec<String>, RpcError> {
        let mut pools: Vec<String> = Vec::new();

        for registry in &self.registries {
            let count_word = self.client.eth_call(registry, POOL_COUNT_SELECTOR)?;
            let count = decode_uint_word(&count_word)?;

            info!("registry {} lists {} pools", registry, count);

            for index in 0..count {
                let data = format!("{}{}", POOL_LIST_SELECTOR, encode_uint(index));
                let word = self.client.eth_call(registry, &data)?;
                let pool = decode_address_word(&word)?;
                if !pools.contains(&pool) {
                    pools.push(pool);
                }
            }
        }

        Ok(pools)
    }
}

/// Normalize transaction hash to include 0x prefix
fn normalize_tx_hash(tx_hash: &str) -> String {
    if tx_hash.starts_with("0x") {
        tx_hash.to_string()
    } else {
        format!("0x{}", tx_hash)
    }
}

/// Map JSON-RPC error to our error type
fn map_rpc_error(error: JsonRpcError) -> RpcError {
    match error.code {
        -32601 => RpcError::MethodNotSupported,
        _ => RpcError::InvalidResponse(format!("{}: {}", error.code, error.message)),
    }
}

/// Block number as the 0x-prefixed hex the RPC expects
fn to_hex(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Parse a 0x-prefixed hex quantity
fn parse_hex_u64(value: &str) -> Result<u64, RpcError> {
    let hex = value
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected hex quantity, got {value:?}")))?;
    u64::from_str_radix(hex, 16)
        .map_err(|_| RpcError::InvalidResponse(format!("invalid hex quantity: {value:?}")))
}

/// ABI-encode a uint256 argument (32 bytes, big-endian, no prefix)
fn encode_uint(value: u64) -> String {
    format!("{:064x}", value)
}

/// Decode a returned 32-byte word as a uint
fn decode_uint_word(word: &str) -> Result<u64, RpcError> {
    let hex = word
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected return word, got {word:?}")))?;
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(trimmed, 16)
        .map_err(|_| RpcError::InvalidResponse(format!("uint word out of range: {word:?}")))
}

/// Decode a returned 32-byte word as an address (last 20 bytes)
fn decode_address_word(word: &str) -> Result<String, RpcError> {
    let hex = word
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected return word, got {word:?}")))?;
    if hex.len() < 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidResponse(format!(
            "invalid address word: {word:?}"
        )));
    }
    Ok(format!("0x{}", hex[hex.len() - 40..].to_ascii_lowercase()))
}

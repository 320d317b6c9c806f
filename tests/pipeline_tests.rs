//! End-to-end pipeline tests over synthetic traces.

use pool_gas_tracker::aggregator::{collect_samples, reduce_samples};
use pool_gas_tracker::parser::build_call_tree;
use pool_gas_tracker::pipeline::gas_table_for_transactions;
use pool_gas_tracker::rpc::TraceSource;
use pool_gas_tracker::utils::error::RpcError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};

const POOL: &str = "0xaaaa000000000000000000000000000000000001";
const ROUTER: &str = "0xbbbb000000000000000000000000000000000002";

const EXCHANGE: &str = "0x3df02124";
const ADD_LIQUIDITY: &str = "0x0b4c7e4d";

/// In-memory trace source backed by canned traces
struct FakeTraceSource {
    traces: HashMap<String, Value>,
}

impl FakeTraceSource {
    fn new(traces: Vec<(&str, Value)>) -> Self {
        Self {
            traces: traces
                .into_iter()
                .map(|(hash, trace)| (hash.to_string(), trace))
                .collect(),
        }
    }
}

impl TraceSource for FakeTraceSource {
    fn trace(&self, tx_hash: &str) -> Result<Value, RpcError> {
        self.traces
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| RpcError::TransactionNotFound(tx_hash.to_string()))
    }
}

fn hashes(list: &[&str]) -> Vec<String> {
    list.iter().map(|h| h.to_string()).collect()
}

/// A router transaction that calls the pool once
fn exchange_trace(gas: u64) -> Value {
    json!({
        "to": ROUTER,
        "gasUsed": gas + 30_000,
        "type": "CALL",
        "input": "0x12345678",
        "calls": [
            { "to": POOL, "gasUsed": gas, "type": "CALL", "input": format!("{EXCHANGE}00000000") }
        ]
    })
}

#[test]
fn attribution_is_complete_and_mean_is_exact() {
    // Three occurrences of the same method with known gas values
    let source = FakeTraceSource::new(vec![
        ("0x01", exchange_trace(90_000)),
        ("0x02", exchange_trace(92_000)),
        ("0x03", exchange_trace(94_000)),
    ]);

    let result =
        gas_table_for_transactions(&source, POOL, &hashes(&["0x01", "0x02", "0x03"]));

    assert_eq!(result.processed, 3);
    assert_eq!(result.skipped(), 0);
    assert_eq!(result.table.count, 3);

    let stats = &result.table.methods[EXCHANGE];
    assert_eq!(stats.count, 3);
    assert!((stats.avg_gas - 92_000.0).abs() < 1e-9);
}

#[test]
fn recursive_invocations_yield_independent_samples() {
    // The pool re-enters itself: two occurrences in one transaction
    let trace = json!({
        "to": POOL,
        "gasUsed": 100_000,
        "type": "CALL",
        "input": EXCHANGE,
        "calls": [
            { "to": POOL, "gasUsed": 40_000, "type": "CALL", "input": EXCHANGE }
        ]
    });
    let source = FakeTraceSource::new(vec![("0x01", trace)]);

    let result = gas_table_for_transactions(&source, POOL, &hashes(&["0x01"]));

    // One contributing transaction, two samples for the method
    assert_eq!(result.table.count, 1);
    let stats = &result.table.methods[EXCHANGE];
    assert_eq!(stats.count, 2);
    assert_eq!(stats.avg_gas, 70_000.0);
}

#[test]
fn malformed_traces_skip_without_aborting_the_batch() {
    let source = FakeTraceSource::new(vec![
        ("0x01", exchange_trace(90_000)),
        // gas value missing on the root frame
        ("0x02", json!({ "to": POOL, "type": "CALL", "input": EXCHANGE })),
        ("0x03", exchange_trace(94_000)),
    ]);

    let result =
        gas_table_for_transactions(&source, POOL, &hashes(&["0x01", "0x02", "0x03"]));

    assert_eq!(result.processed, 2);
    assert_eq!(result.skipped_malformed, 1);
    assert_eq!(result.table.count, 2);
    assert_eq!(result.table.methods[EXCHANGE].avg_gas, 92_000.0);
}

#[test]
fn fetch_failures_skip_without_aborting_the_batch() {
    let source = FakeTraceSource::new(vec![("0x01", exchange_trace(90_000))]);

    let result = gas_table_for_transactions(&source, POOL, &hashes(&["0x01", "0xdead"]));

    assert_eq!(result.processed, 1);
    assert_eq!(result.skipped_fetch, 1);
    assert_eq!(result.table.count, 1);
}

#[test]
fn untargeted_transactions_do_not_contribute() {
    // A transaction that never touches the pool
    let other_trace = json!({
        "to": ROUTER,
        "gasUsed": 60_000,
        "type": "CALL",
        "input": "0x99999999"
    });
    let source = FakeTraceSource::new(vec![
        ("0x01", exchange_trace(90_000)),
        ("0x02", other_trace),
    ]);

    let result = gas_table_for_transactions(&source, POOL, &hashes(&["0x01", "0x02"]));

    // Both parsed, only one contributed evidence
    assert_eq!(result.processed, 2);
    assert_eq!(result.table.count, 1);
    assert_eq!(result.table.methods[EXCHANGE].count, 1);
}

#[test]
fn empty_batch_yields_empty_table() {
    let source = FakeTraceSource::new(vec![]);

    let result = gas_table_for_transactions(&source, POOL, &[]);

    assert!(result.table.is_empty());
    assert_eq!(result.table.count, 0);
}

#[test]
fn call_kinds_gate_attribution() {
    // Delegate and static calls attribute; the creation frame does not
    let trace = json!({
        "to": ROUTER,
        "gasUsed": 500_000,
        "type": "CALL",
        "input": "0x12345678",
        "calls": [
            { "to": POOL, "gasUsed": 50_000, "type": "DELEGATECALL", "input": EXCHANGE },
            { "to": POOL, "gasUsed": 2_000, "type": "STATICCALL", "input": ADD_LIQUIDITY },
            { "to": POOL, "gasUsed": 300_000, "type": "CREATE", "input": "0x60806040" }
        ]
    });
    let source = FakeTraceSource::new(vec![("0x01", trace)]);

    let result = gas_table_for_transactions(&source, POOL, &hashes(&["0x01"]));

    assert_eq!(result.table.methods.len(), 2);
    assert_eq!(result.table.methods[EXCHANGE].avg_gas, 50_000.0);
    assert_eq!(result.table.methods[ADD_LIQUIDITY].avg_gas, 2_000.0);
}

#[test]
fn reduction_ignores_sample_order() {
    let deep_trace = json!({
        "to": POOL,
        "gasUsed": 80_000,
        "type": "CALL",
        "input": EXCHANGE,
        "calls": [
            { "to": ROUTER, "gasUsed": 30_000, "type": "CALL", "input": "0x11111111",
              "calls": [
                  { "to": POOL, "gasUsed": 12_000, "type": "CALL", "input": ADD_LIQUIDITY }
              ] }
        ]
    });

    let targets: BTreeSet<String> = [POOL.to_string()].into();
    let tree = build_call_tree("0x01", &deep_trace, &targets).unwrap();

    let mut samples = collect_samples(&tree);
    let forward = reduce_samples(&samples, 1);
    samples.reverse();
    let backward = reduce_samples(&samples, 1);

    assert_eq!(forward, backward);
    assert_eq!(forward.methods[EXCHANGE].avg_gas, 80_000.0);
    assert_eq!(forward.methods[ADD_LIQUIDITY].avg_gas, 12_000.0);
}

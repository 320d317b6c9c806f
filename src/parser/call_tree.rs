//! Call tree builder for raw execution traces.
//!
//! Converts the nested JSON emitted by `debug_traceTransaction` with the
//! `callTracer` into a typed tree of invocations. Nesting and child order
//! are preserved; frames outside the target address set stay in the tree
//! so gas accounting remains hierarchical, and the attributor decides
//! later which frames produce samples.

use crate::utils::error::TraceError;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Classification of one invocation.
///
/// The raw trace reports a free-form tag; we close it into an enum so
/// attribution eligibility can be decided exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Plain external call
    Call,
    /// Delegate call (includes the legacy CALLCODE form)
    DelegateCall,
    /// Read-only call
    StaticCall,
    /// Contract creation
    Create,
}

impl CallKind {
    /// Decode the `type` tag of a trace frame
    pub fn from_tag(tag: &str) -> Result<Self, TraceError> {
        match tag.to_ascii_uppercase().as_str() {
            "CALL" => Ok(CallKind::Call),
            "DELEGATECALL" | "CALLCODE" => Ok(CallKind::DelegateCall),
            "STATICCALL" => Ok(CallKind::StaticCall),
            "CREATE" | "CREATE2" => Ok(CallKind::Create),
            other => Err(TraceError::UnknownCallKind(other.to_string())),
        }
    }

    /// Whether a frame of this kind can produce a gas sample.
    ///
    /// Creations have no method selector, so they are never attributed.
    pub fn is_attributable(&self) -> bool {
        !matches!(self, CallKind::Create)
    }

    /// Short tag for rendering
    pub fn label(&self) -> &'static str {
        match self {
            CallKind::Call => "CALL",
            CallKind::DelegateCall => "DELEGATECALL",
            CallKind::StaticCall => "STATICCALL",
            CallKind::Create => "CREATE",
        }
    }
}

/// One invocation node of a call tree
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Contract address (lowercased hex)
    pub address: String,

    /// 4-byte method selector as `0x...` hex; `"0x"` when calldata is
    /// empty. Kept opaque: selectors stay attributable without ABI data.
    pub method: String,

    /// Gas attributed to this invocation and its descendants
    pub gas_used: u64,

    /// Invocation classification
    pub kind: CallKind,

    /// Child invocations in execution order
    pub children: Vec<CallFrame>,
}

impl CallFrame {
    /// Sum of the direct children's gas
    pub fn children_gas(&self) -> u64 {
        self.children.iter().map(|c| c.gas_used).sum()
    }

    /// Number of frames in this subtree, including self
    pub fn frame_count(&self) -> usize {
        1 + self.children.iter().map(CallFrame::frame_count).sum::<usize>()
    }
}

/// A parsed call tree: root frame, originating transaction, and the
/// target addresses the attributor will filter on.
#[derive(Debug, Clone)]
pub struct CallTree {
    pub tx_hash: String,
    pub root: CallFrame,
    pub targets: BTreeSet<String>,
}

/// Raw frame shape as emitted by the callTracer.
///
/// Everything is optional here; required-field validation happens in the
/// conversion so a missing field reports a trace error instead of a
/// generic deserialization failure.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    to: Option<String>,

    #[serde(default, rename = "gasUsed")]
    gas_used: Option<serde_json::Value>,

    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    input: Option<String>,

    #[serde(default)]
    calls: Vec<RawFrame>,
}

/// Build a call tree from one raw trace
///
/// **Public** - main entry point for tree construction
///
/// # Arguments
/// * `tx_hash` - Transaction the trace belongs to
/// * `raw_trace` - Raw JSON from debug_traceTransaction (callTracer)
/// * `targets` - Addresses of interest (any casing; normalized here)
///
/// # Errors
/// `TraceError` if any node is missing its address or gas value, carries
/// an unparseable gas value, or uses an unknown call-kind tag. The error
/// covers this transaction only; callers processing a batch skip it and
/// continue.
pub fn build_call_tree(
    tx_hash: &str,
    raw_trace: &serde_json::Value,
    targets: &BTreeSet<String>,
) -> Result<CallTree, TraceError> {
    debug!("Building call tree for transaction: {}", tx_hash);

    let raw: RawFrame = RawFrame::deserialize(raw_trace)?;
    let root = convert_frame(&raw)?;

    debug!("Call tree has {} frames", root.frame_count());

    Ok(CallTree {
        tx_hash: tx_hash.to_string(),
        root,
        targets: targets.iter().map(|a| normalize_address(a)).collect(),
    })
}

/// Convert one raw frame and its children, validating required fields
///
/// **Private** - recursive worker for build_call_tree
fn convert_frame(raw: &RawFrame) -> Result<CallFrame, TraceError> {
    let address = raw
        .to
        .as_deref()
        .map(normalize_address)
        .ok_or(TraceError::MissingAddress)?;

    let gas_used = match &raw.gas_used {
        Some(value) => parse_gas_value(value)?,
        None => return Err(TraceError::MissingGas),
    };

    let kind = match raw.kind.as_deref() {
        Some(tag) => CallKind::from_tag(tag)?,
        None => return Err(TraceError::UnknownCallKind("<missing>".to_string())),
    };

    let mut children = Vec::with_capacity(raw.calls.len());
    for child in &raw.calls {
        children.push(convert_frame(child)?);
    }

    let frame = CallFrame {
        address,
        method: extract_selector(raw.input.as_deref()),
        gas_used,
        kind,
        children,
    };

    // Gas accounting is hierarchical: a frame covers its descendants.
    // Some traces report refund-adjusted values that break this, so we
    // only report it.
    let children_gas = frame.children_gas();
    if frame.gas_used < children_gas {
        warn!(
            "frame {} reports {} gas but children sum to {}",
            frame.address, frame.gas_used, children_gas
        );
    }

    Ok(frame)
}

/// Parse a gas value from a JSON number or a hex/decimal string
///
/// **Private** - internal utility
fn parse_gas_value(value: &serde_json::Value) -> Result<u64, TraceError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let Some(s) = value.as_str() else {
        return Err(TraceError::InvalidGas(value.to_string()));
    };
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).map_err(|_| TraceError::InvalidGas(s.to_string()))
    } else {
        s.parse::<u64>()
            .map_err(|_| TraceError::InvalidGas(s.to_string()))
    }
}

/// First 4 bytes of calldata as `0x...`, or `"0x"` when there are none
///
/// **Private** - internal utility
fn extract_selector(input: Option<&str>) -> String {
    let data = input.unwrap_or("0x");
    let hex = data.strip_prefix("0x").unwrap_or(data);
    if hex.len() >= 8 {
        format!("0x{}", hex[..8].to_ascii_lowercase())
    } else {
        "0x".to_string()
    }
}

/// Lowercase an address so set membership ignores checksum casing
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

//! Call tree parsing and rendering.
//!
//! This module handles:
//! - Converting raw `callTracer` output into a typed call tree
//! - Validating required per-frame fields
//! - Rendering a call tree as indented text for diagnostics

pub mod call_tree;
pub mod render;

// Re-export main types
pub use call_tree::{build_call_tree, CallFrame, CallKind, CallTree};
pub use render::render_tree;

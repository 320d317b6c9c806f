//! Text rendering of call trees for the diagnostic command.
//!
//! One line per frame, indented by depth, with attributable frames
//! (targeted address, non-creation kind) marked by a trailing `*`.

use super::call_tree::{CallFrame, CallTree};
use std::fmt::Write;

/// Render a call tree as indented text
///
/// **Public** - used by the tx diagnostic command
pub fn render_tree(tree: &CallTree) -> String {
    let mut out = String::new();
    render_frame(&mut out, tree, &tree.root, 0);
    out
}

fn render_frame(out: &mut String, tree: &CallTree, frame: &CallFrame, depth: usize) {
    let marker = if frame.kind.is_attributable() && tree.targets.contains(&frame.address) {
        " *"
    } else {
        ""
    };
    // String formatting cannot fail here
    let _ = writeln!(
        out,
        "{:indent$}{} {} [{}] gas={}{}",
        "",
        frame.kind.label(),
        frame.address,
        frame.method,
        frame.gas_used,
        marker,
        indent = depth * 2
    );
    for child in &frame.children {
        render_frame(out, tree, child, depth + 1);
    }
}

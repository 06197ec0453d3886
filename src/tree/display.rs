//! Debug printing of trees.

use std::fmt::Write;

use text_size::TextSize;

use super::{NodeRef, Tree};

/// Kinds and byte ranges of the visible nodes, as an S-expression:
/// `(expr [0..3] (num [0..1]) ("+" [1..2]) (num [2..3]))`.
pub fn tree_to_string(tree: &Tree) -> String {
    let mut out = String::new();
    write_ranges(&mut out, tree.root_node());
    out
}

fn write_ranges(out: &mut String, node: NodeRef<'_>) {
    let range = node.byte_range();
    let (start, end) = (u32::from(range.start()), u32::from(range.end()));
    if node.is_named() {
        let _ = write!(out, "({} [{start}..{end}]", node.kind());
        for child in node.visible_children() {
            out.push(' ');
            write_ranges(out, child);
        }
        out.push(')');
    } else {
        let _ = write!(out, "({:?} [{start}..{end}])", node.kind());
    }
}

pub(super) fn to_sexp(tree: &Tree) -> String {
    let mut out = String::new();
    write_sexp(&mut out, tree.root_node());
    out
}

fn write_sexp(out: &mut String, node: NodeRef<'_>) {
    let text = || String::from_utf8_lossy(node.text());
    if !node.is_named() {
        out.push_str(&text());
        return;
    }
    let _ = write!(out, "({}", node.kind());
    if node.node().is_leaf() {
        if node.node().size() > TextSize::new(0) {
            let _ = write!(out, " {}", text());
        }
    } else {
        for child in node.visible_children() {
            out.push(' ');
            write_sexp(out, child);
        }
    }
    out.push(')');
}

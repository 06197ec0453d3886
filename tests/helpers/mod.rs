//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod source_fixtures;

use std::sync::Once;

use heptagon::{GrammarHandle, InputEdit, Tree, load_grammar, parse};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn arithmetic() -> GrammarHandle {
    init_tracing();
    load_grammar("arithmetic").unwrap()
}

pub fn heptagon_grammar() -> GrammarHandle {
    init_tracing();
    load_grammar("heptagon").unwrap()
}

/// Replace `[start, end)` of the tree's source; returns the new source and edit.
pub fn splice(tree: &Tree, start: usize, end: usize, text: &str) -> (Vec<u8>, InputEdit) {
    InputEdit::replace(
        tree.source(),
        (start as u32).into(),
        (end as u32).into(),
        text.as_bytes(),
    )
    .unwrap()
}

/// Assert that `tree` is what a fresh parse of its own source produces.
pub fn assert_matches_fresh_parse(tree: &Tree) {
    let fresh = parse(tree.grammar(), tree.source());
    assert!(
        tree.structurally_eq(&fresh),
        "incremental:\n{}\nfresh:\n{}",
        tree.to_sexp(),
        fresh.to_sexp()
    );
}

/// Assert that a tree has no ERROR nodes, listing them otherwise.
pub fn assert_no_errors(tree: &Tree) {
    let errors = tree.errors();
    assert!(
        errors.is_empty(),
        "Expected no errors, got {}:\n{}",
        errors.len(),
        errors
            .iter()
            .map(|e| format!("  {}", e.format()))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

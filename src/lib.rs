//! # heptagon-base
//!
//! Incremental, table-driven LR parsing core, with the Heptagon grammar
//! as its first built-in language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! parser    → LR driver, error recovery, incremental reparse
//!   ↓
//! tree      → Immutable shared syntax trees, rowan view, printing
//!   ↓
//! lexer     → Context-aware tokenizer driven by lex modes
//!   ↓
//! languages → Built-in grammars (heptagon, arithmetic)
//!   ↓
//! grammar   → Symbols, builder, LALR(1) tables, lexical DFA, registry
//!   ↓
//! errors    → Fatal errors and syntax diagnostics
//!   ↓
//! base      → Primitives (TextRange, Point, LineIndex)
//! ```
//!
//! ```
//! use heptagon::{load_grammar, parse};
//!
//! let grammar = load_grammar("arithmetic").unwrap();
//! let tree = parse(&grammar, "1 + 2");
//! assert_eq!(tree.to_sexp(), "(expr (num 1) + (num 2))");
//! ```

// ============================================================================
// MODULES (dependency order: base → errors → grammar → lexer → tree → parser)
// ============================================================================

/// Foundation types: TextRange, Point, LineIndex
pub mod base;

/// Fatal errors and syntax diagnostics
pub mod errors;

/// Grammar definitions, parse tables and the grammar registry
pub mod grammar;

/// Built-in grammars
pub mod languages;

/// Tokenizer over the lexical DFA
pub mod lexer;

/// Edit descriptors for incremental reparsing
pub mod edit;

/// Syntax trees
pub mod tree;

/// Parser entry points
pub mod parser;

// Re-export foundation types
pub use base::{LineIndex, Point, TextRange, TextSize};

pub use edit::InputEdit;
pub use errors::{Error, ErrorCode, Result, SyntaxError};
pub use grammar::{Grammar, GrammarBuilder, GrammarHandle, load_grammar, register_grammar};
pub use parser::{ParseOptions, ParseStats, Parser, parse, reparse};
pub use tree::{Node, NodeRef, Tree, tree_to_string};

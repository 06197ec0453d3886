//! Table-driven incremental LR parser
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (lexical DFA, lex mode of the top state) → Tokens
//!     ↓
//! Driver (action/goto tables, error recovery) → shift / reduce
//!     ↓
//! TreeBuilder → immutable, shared Nodes
//!     ↓
//! Tree (+ rowan CST view)
//! ```
//!
//! ## Incremental Reparsing
//!
//! When text changes, we:
//! 1. Walk the old tree in source order next to the parser
//! 2. Reuse every subtree the edit cannot have affected, shifted by the
//!    edit's length change, whenever the parser reaches its start in the
//!    state it was built in; the token after a reused subtree is lexed in
//!    the mode it was lexed in before
//! 3. Relex and reparse only around the edit; relexed tokens that turn out
//!    unchanged get their old leaf back

mod driver;
mod reuse;
mod stack;

use std::sync::Arc;

use text_size::TextSize;
use tracing::debug;

use crate::edit::InputEdit;
use crate::errors::{Error, Result};
use crate::grammar::GrammarHandle;
use crate::tree::Tree;

use driver::Session;
use reuse::ReuseCursor;

/// Limits for a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Stop after this many parser operations; the rest of the input
    /// becomes an ERROR leaf and the tree is marked partial.
    pub max_operations: Option<u64>,
    /// How deep error recovery may pop the stack to resynchronise
    pub max_recovery_pops: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_operations: None,
            max_recovery_pops: 3,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_operations(mut self, max: u64) -> Self {
        self.max_operations = Some(max);
        self
    }

    pub fn with_max_recovery_pops(mut self, max: usize) -> Self {
        self.max_recovery_pops = max;
        self
    }
}

/// Counters from the most recent parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Tokens produced by the lexer
    pub tokens_lexed: usize,
    /// Old subtrees and leaves pushed without lexing
    pub nodes_reused: usize,
    /// Relexed tokens replaced by their identical old leaf
    pub leaves_relinked: usize,
    /// Shift, reduce and recovery steps
    pub operations: u64,
    /// Error recovery episodes
    pub recoveries: usize,
}

/// A parser instance for one grammar.
///
/// Each instance owns its parse stack and lexer cursor for the duration of
/// a call; use one instance per thread.
pub struct Parser {
    grammar: GrammarHandle,
    options: ParseOptions,
    last_stats: ParseStats,
}

impl Parser {
    pub fn new(grammar: GrammarHandle) -> Self {
        Self {
            grammar,
            options: ParseOptions::default(),
            last_stats: ParseStats::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grammar(&self) -> &GrammarHandle {
        &self.grammar
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    pub fn last_stats(&self) -> ParseStats {
        self.last_stats
    }

    /// Parse `source` from scratch. Always produces a tree.
    pub fn parse(&mut self, source: impl AsRef<[u8]>) -> Tree {
        self.run(Arc::from(source.as_ref()), None)
    }

    /// Parse `source`, the result of applying `edit` to the source of `old`,
    /// reusing the parts of `old` the edit did not affect.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEdit`] if the edit does not fit `old` and `source`,
    /// or if `old` was parsed with another grammar. Fall back to
    /// [`Parser::parse`] in that case.
    pub fn reparse(
        &mut self,
        old: &Tree,
        edit: &InputEdit,
        source: impl AsRef<[u8]>,
    ) -> Result<Tree> {
        if !Arc::ptr_eq(old.grammar(), &self.grammar) {
            return Err(Error::invalid_edit(format!(
                "tree was parsed with grammar `{}`, not `{}`",
                old.language(),
                self.grammar.name()
            )));
        }
        let source = source.as_ref();
        edit.validate(old.len(), TextSize::new(source.len() as u32))?;

        let tree = self.run(Arc::from(source), Some((old, edit)));
        debug!(
            tokens_lexed = self.last_stats.tokens_lexed,
            nodes_reused = self.last_stats.nodes_reused,
            leaves_relinked = self.last_stats.leaves_relinked,
            "reparsed"
        );
        Ok(tree)
    }

    fn run(&mut self, source: Arc<[u8]>, previous: Option<(&Tree, &InputEdit)>) -> Tree {
        let grammar = self.grammar.clone();
        let reuse = previous.map(|(old, edit)| ReuseCursor::new(old.root(), edit));
        let outcome = Session::new(&grammar, &source, &self.options, reuse).run();
        self.last_stats = outcome.stats;
        Tree::new(outcome.root, grammar, source, outcome.partial)
    }
}

/// Parse `source` from scratch with `grammar`.
pub fn parse(grammar: &GrammarHandle, source: impl AsRef<[u8]>) -> Tree {
    Parser::new(grammar.clone()).parse(source)
}

/// Incrementally reparse `source` after `edit`, reusing `old`.
///
/// # Errors
///
/// [`Error::InvalidEdit`] when the edit does not fit `old` and `source`.
pub fn reparse(
    grammar: &GrammarHandle,
    old: &Tree,
    edit: &InputEdit,
    source: impl AsRef<[u8]>,
) -> Result<Tree> {
    Parser::new(grammar.clone()).reparse(old, edit, source)
}

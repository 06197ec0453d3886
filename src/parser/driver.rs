//! The shift/reduce engine.
//!
//! One [`Session`] runs one parse: it pulls lookaheads (reused old subtrees
//! first, freshly lexed tokens otherwise), dispatches on the table action
//! and recovers from errors without ever failing.
//!
//! Recovery, on a token with no action in the top state:
//! 1. Once per input position, look down the stack for the nearest state
//!    that has an action for the token. If it is within
//!    `max_recovery_pops` entries (any depth at end of input), the entries
//!    above it are wrapped in an ERROR node and the token is retried.
//! 2. Otherwise the token is wrapped in an ERROR node and skipped;
//!    consecutive skipped tokens share one ERROR node.
//! 3. At end of input with nothing left to try, everything parsed so far
//!    becomes the children of an ERROR root.
//!
//! Each step consumes input or shrinks the stack, so parsing terminates.
//!
//! When reparsing, an old subtree is taken only where the parser is in the
//! state the subtree was built in and a fresh parse would rebuild it from
//! its first leaf. Reductions a fresh parse would make on that leaf are
//! made first, so extras on the stack end up where a fresh parse puts them.

use std::iter;

use text_size::TextSize;
use tracing::{debug, trace};

use super::reuse::{ReuseCursor, first_leaf};
use super::stack::{ParseStack, StackEntry};
use super::{ParseOptions, ParseStats};
use crate::errors::ErrorCode;
use crate::grammar::{Action, Grammar, LexModeId, ProductionId, StateId, Symbol};
use crate::lexer::{Lexer, Token};
use crate::tree::{Node, TreeBuilder};

pub(crate) struct Outcome {
    pub root: Node,
    pub partial: bool,
    pub stats: ParseStats,
}

enum Recovered {
    /// The stack changed; try the same lookahead again
    Retry(Node),
    /// The lookahead was skipped
    Skipped,
    Finished(Outcome),
}

pub(crate) struct Session<'a> {
    grammar: &'a Grammar,
    source: &'a [u8],
    options: &'a ParseOptions,
    lexer: Lexer<'a>,
    builder: TreeBuilder<'a>,
    stack: ParseStack,
    reuse: Option<ReuseCursor<'a>>,
    position: TextSize,
    stats: ParseStats,
    /// Position of the last pop-to-synchronise attempt
    recovered_at: Option<TextSize>,
    /// Stack height while the top entry is a skip ERROR that can absorb more tokens
    open_skip: Option<usize>,
    /// Lex mode for the next token after a reused subtree and any extras
    /// following it
    carried_mode: Option<LexModeId>,
}

impl<'a> Session<'a> {
    pub fn new(
        grammar: &'a Grammar,
        source: &'a [u8],
        options: &'a ParseOptions,
        reuse: Option<ReuseCursor<'a>>,
    ) -> Self {
        Self {
            grammar,
            source,
            options,
            lexer: Lexer::new(grammar, source),
            builder: TreeBuilder::new(grammar),
            stack: ParseStack::default(),
            reuse,
            position: TextSize::new(0),
            stats: ParseStats::default(),
            recovered_at: None,
            open_skip: None,
            carried_mode: None,
        }
    }

    pub fn run(mut self) -> Outcome {
        let Some(mut lookahead) = self.next_lookahead() else {
            return self.abort();
        };

        loop {
            self.stats.operations += 1;
            let state = self.stack.top_state();
            let symbol = lookahead.symbol();

            if lookahead.is_extra() {
                self.push(state, lookahead);
            } else if !self.grammar.is_terminal(symbol) {
                // A reused subtree stands in for everything it covers
                match self.grammar.goto(state, symbol) {
                    Some(next) => self.push(next, lookahead),
                    None => self.skip(lookahead),
                }
            } else {
                match self.grammar.action(state, symbol) {
                    Action::Shift(next) => self.push(next, lookahead),
                    Action::Reduce(production) => {
                        self.reduce(production, &lookahead);
                        continue;
                    }
                    Action::Accept => return self.accept(lookahead),
                    Action::Recover => match self.recover(lookahead) {
                        Recovered::Retry(node) => {
                            lookahead = node;
                            continue;
                        }
                        Recovered::Skipped => {}
                        Recovered::Finished(outcome) => return outcome,
                    },
                }
            }

            lookahead = match self.next_lookahead() {
                Some(node) => node,
                None => return self.abort(),
            };
        }
    }

    /// The next lookahead at the current position, or `None` once the
    /// operation budget is spent.
    fn next_lookahead(&mut self) -> Option<Node> {
        if self
            .options
            .max_operations
            .is_some_and(|max| self.stats.operations >= max)
        {
            return None;
        }

        let carried = self.carried_mode.take();
        let mode = carried.unwrap_or_else(|| self.grammar.lex_mode(self.stack.top_state()));

        let node = match self.reuse_at(mode) {
            Some(node) => {
                trace!(
                    kind = self.grammar.symbol_name(node.symbol()),
                    position = u32::from(self.position),
                    "reusing subtree"
                );
                self.stats.nodes_reused += 1;
                node
            }
            None => self.lex(mode),
        };
        if node.is_extra() && self.carried_mode.is_none() {
            self.carried_mode = carried;
        }
        Some(node)
    }

    fn lex(&mut self, mode: LexModeId) -> Node {
        self.lexer.seek(self.position);
        let token = self.lexer.next_token(mode);
        self.stats.tokens_lexed += 1;

        if let Some(old) = self.reuse.as_ref().and_then(|cursor| cursor.matching_leaf(&token)) {
            self.stats.leaves_relinked += 1;
            return old;
        }
        self.builder.leaf(&token, self.stack.top_state())
    }

    /// An old node that stands in for what lexing in `mode` and parsing
    /// would produce at the current position.
    fn reuse_at(&mut self, mode: LexModeId) -> Option<Node> {
        let mut cursor = self.reuse.take()?;
        let reused = self.take_from(&mut cursor, mode);
        self.reuse = Some(cursor);
        reused
    }

    fn take_from(&mut self, cursor: &mut ReuseCursor<'a>, mode: LexModeId) -> Option<Node> {
        loop {
            let node = cursor.candidate(self.position)?;
            let first = first_leaf(&node)?.clone();
            // Any node here starts with this leaf; if it was lexed in
            // another mode, relex
            if first.lex_mode() != mode {
                return None;
            }
            if node.is_leaf() {
                cursor.advance();
                return Some(node);
            }
            if node.is_extra() || first.is_extra() {
                cursor.descend();
                continue;
            }

            let state = self.stack.top_state();
            let action = self.grammar.action(state, first.symbol());
            if self.fits(&node, state, action) {
                self.carried_mode = cursor.accept();
                return Some(node);
            }
            match action {
                Action::Reduce(production) => {
                    self.stats.operations += 1;
                    self.reduce(production, &first);
                }
                _ => cursor.descend(),
            }
        }
    }

    /// Would a fresh parse in `state`, with the node's first leaf as
    /// lookahead, rebuild `node` as it is?
    fn fits(&self, node: &Node, state: StateId, action: Action) -> bool {
        if node.parse_state() != state || self.grammar.goto(state, node.symbol()).is_none() {
            return false;
        }
        match action {
            Action::Shift(_) => true,
            // Empty reductions at the node's start, which would slide an
            // extra on top of the stack into the node
            Action::Reduce(production) => {
                self.grammar.productions()[production as usize].is_empty()
                    && !self.stack.top_is_extra()
            }
            Action::Accept | Action::Recover => false,
        }
    }

    fn examined_end(&self, lookahead: &Node) -> u32 {
        u32::from(self.position + lookahead.total_len()) + lookahead.lookahead()
    }

    /// Push the lookahead and move past it.
    fn push(&mut self, state: StateId, node: Node) {
        self.position += node.total_len();
        self.stack.push(state, node, self.position);
        self.open_skip = None;
    }

    fn reduce(&mut self, id: ProductionId, lookahead: &Node) {
        let grammar = self.grammar;
        let production = &grammar.productions()[id as usize];
        let (popped, trailing) = self.stack.pop_for_reduce(production.len());
        let entry_state = self.stack.top_state();
        let end = popped
            .last()
            .map_or_else(|| self.stack.top_end(), |entry| entry.end);
        let examined = popped
            .iter()
            .map(StackEntry::examined_end)
            .chain(iter::once(self.examined_end(lookahead)))
            .max()
            .unwrap_or_default();

        let children = popped.into_iter().map(|entry| entry.node).collect();
        let node = self.builder.build_node(
            production.lhs,
            children,
            entry_state,
            examined.saturating_sub(u32::from(end)),
        );
        let next = grammar
            .goto(entry_state, production.lhs)
            .unwrap_or(entry_state);
        self.stack.push(next, node, end);
        for extra in trailing {
            self.stack.push(next, extra.node, extra.end);
        }
        self.open_skip = None;
    }

    fn accept(mut self, end: Node) -> Outcome {
        let mut children = Vec::new();
        for entry in self.stack.drain() {
            if entry.node.is_extra() {
                children.push(entry.node);
            } else {
                children.extend(entry.node.children().iter().cloned());
            }
        }
        self.position += end.total_len();
        children.push(end);
        let root = self
            .builder
            .build_node(self.grammar.start_symbol(), children, 0, 1);
        self.finish(root, false)
    }

    fn recover(&mut self, lookahead: Node) -> Recovered {
        let symbol = lookahead.symbol();
        let at_end = symbol == Symbol::END;

        if self.recovered_at != Some(self.position) {
            self.recovered_at = Some(self.position);
            let limit = if at_end {
                usize::MAX
            } else {
                self.options.max_recovery_pops
            };
            let grammar = self.grammar;
            let depth = self
                .stack
                .depth_until(limit, |state| grammar.action(state, symbol) != Action::Recover);
            if let Some(depth) = depth {
                self.pop_into_error(depth, at_end);
                return Recovered::Retry(lookahead);
            }
        }

        if at_end {
            return Recovered::Finished(self.finish_with_error(lookahead));
        }
        self.skip(lookahead);
        Recovered::Skipped
    }

    fn pop_into_error(&mut self, depth: usize, at_end: bool) {
        let popped = self.stack.pop_many(depth);
        let state = self.stack.top_state();
        let end = popped
            .last()
            .map_or_else(|| self.stack.top_end(), |entry| entry.end);
        let examined = popped
            .iter()
            .map(StackEntry::examined_end)
            .max()
            .unwrap_or(u32::from(end));
        let code = if at_end {
            ErrorCode::E0202
        } else {
            ErrorCode::E0201
        };

        trace!(
            popped = popped.len(),
            state,
            position = u32::from(self.position),
            "recovery: popped to a synchronising state"
        );
        self.stats.recoveries += 1;

        let children = popped.into_iter().map(|entry| entry.node).collect();
        let error = self.builder.error_node(
            children,
            state,
            examined.saturating_sub(u32::from(end)),
            code,
            true,
        );
        self.stack.push(state, error, end);
        self.open_skip = None;
    }

    fn skip(&mut self, lookahead: Node) {
        let state = self.stack.top_state();
        let examined = self.examined_end(&lookahead);
        self.position += lookahead.total_len();

        let mut children = Vec::new();
        let previous = if self.open_skip == Some(self.stack.len()) {
            self.stack.pop()
        } else {
            None
        };
        match previous {
            Some(previous) => children.extend(previous.node.children().iter().cloned()),
            None => {
                trace!(
                    kind = self.grammar.symbol_name(lookahead.symbol()),
                    position = u32::from(self.position),
                    "recovery: skipping token"
                );
                self.stats.recoveries += 1;
            }
        }
        children.push(lookahead);

        let code = if children[0].is_error() {
            ErrorCode::E0101
        } else {
            ErrorCode::E0201
        };
        let lookahead_len = examined.saturating_sub(u32::from(self.position));
        let error = self
            .builder
            .error_node(children, state, lookahead_len, code, true);
        self.stack.push(state, error, self.position);
        self.open_skip = Some(self.stack.len());
    }

    fn finish_with_error(&mut self, end: Node) -> Outcome {
        trace!(
            entries = self.stack.len(),
            "recovery: wrapping the whole input in an ERROR node"
        );
        let mut children: Vec<Node> = self
            .stack
            .drain()
            .into_iter()
            .map(|entry| entry.node)
            .collect();
        self.position += end.total_len();
        children.push(end);
        let root = self
            .builder
            .error_node(children, 0, 1, ErrorCode::E0202, false);
        self.finish(root, false)
    }

    /// Budget exhausted: keep what was parsed, the rest becomes one ERROR leaf.
    fn abort(&mut self) -> Outcome {
        debug!(
            operations = self.stats.operations,
            position = u32::from(self.position),
            "parse aborted: operation budget exhausted"
        );
        let state = self.stack.top_state();
        let lex_mode = self.grammar.lex_mode(state);
        let len = TextSize::new(self.source.len() as u32);
        let mut children: Vec<Node> = self
            .stack
            .drain()
            .into_iter()
            .map(|entry| entry.node)
            .collect();

        if self.position < len {
            let rest = Token {
                symbol: Symbol::ERROR,
                offset: self.position,
                padding: TextSize::new(0),
                len: len - self.position,
                lookahead: 1,
                lex_mode,
            };
            children.push(self.builder.leaf(&rest, state));
        }
        let end = Token {
            symbol: Symbol::END,
            offset: len,
            padding: TextSize::new(0),
            len: TextSize::new(0),
            lookahead: 1,
            lex_mode,
        };
        children.push(self.builder.leaf(&end, state));
        self.position = len;

        let root = self
            .builder
            .error_node(children, 0, 1, ErrorCode::E0301, false);
        self.finish(root, true)
    }

    fn finish(&mut self, root: Node, partial: bool) -> Outcome {
        Outcome {
            root,
            partial,
            stats: self.stats,
        }
    }
}

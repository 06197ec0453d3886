//! Node construction for one parse session.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::node::{Node, NodeData};
use crate::errors::ErrorCode;
use crate::grammar::{Extra, Grammar, StateId, Symbol};
use crate::lexer::Token;

#[derive(PartialEq, Eq, Hash)]
struct InternKey {
    symbol: Symbol,
    parse_state: StateId,
    lookahead: u32,
    children: Box<[usize]>,
}

/// Builds nodes, hash-consing hidden ones.
///
/// Two hidden nodes built from the same children in the same state are the
/// same node. Visible nodes are always distinct.
pub(crate) struct TreeBuilder<'g> {
    grammar: &'g Grammar,
    interned: FxHashMap<InternKey, Node>,
}

impl<'g> TreeBuilder<'g> {
    pub(crate) fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            interned: FxHashMap::default(),
        }
    }

    pub(crate) fn leaf(&self, token: &Token, parse_state: StateId) -> Node {
        let is_error = token.symbol == Symbol::ERROR;
        Node(Arc::new(NodeData {
            symbol: token.symbol,
            padding: token.padding,
            size: token.len,
            lookahead: token.lookahead,
            parse_state,
            lex_mode: token.lex_mode,
            extra: self.grammar.extra(token.symbol) == Extra::Node,
            hidden: self.grammar.is_hidden(token.symbol),
            has_error: is_error,
            error: is_error.then_some(ErrorCode::E0101),
            children: Box::new([]),
        }))
    }

    /// Reduce `children` into a node of kind `symbol`.
    pub(crate) fn build_node(
        &mut self,
        symbol: Symbol,
        children: Vec<Node>,
        parse_state: StateId,
        lookahead: u32,
    ) -> Node {
        if !self.grammar.is_hidden(symbol) {
            return self.assemble(symbol, children, parse_state, lookahead, false, None);
        }

        let key = InternKey {
            symbol,
            parse_state,
            lookahead,
            children: children.iter().map(Node::addr).collect(),
        };
        if let Some(existing) = self.interned.get(&key) {
            return existing.clone();
        }
        let node = self.assemble(symbol, children, parse_state, lookahead, false, None);
        self.interned.insert(key, node.clone());
        node
    }

    /// Wrap `children` in an ERROR node.
    pub(crate) fn error_node(
        &mut self,
        children: Vec<Node>,
        parse_state: StateId,
        lookahead: u32,
        code: ErrorCode,
        extra: bool,
    ) -> Node {
        self.assemble(Symbol::ERROR, children, parse_state, lookahead, extra, Some(code))
    }

    fn assemble(
        &self,
        symbol: Symbol,
        children: Vec<Node>,
        parse_state: StateId,
        lookahead: u32,
        extra: bool,
        error: Option<ErrorCode>,
    ) -> Node {
        let total = children
            .iter()
            .fold(TextSize::new(0), |sum, child| sum + child.total_len());
        // Leading empty children contribute nothing, so padding is the first
        // non-empty child's padding
        let padding = children
            .iter()
            .find(|child| child.total_len() > TextSize::new(0))
            .map_or(TextSize::new(0), Node::padding);
        let lex_mode = children
            .first()
            .map_or_else(|| self.grammar.lex_mode(parse_state), Node::lex_mode);
        let has_error = symbol == Symbol::ERROR || children.iter().any(Node::has_error);

        Node(Arc::new(NodeData {
            symbol,
            padding,
            size: total - padding,
            lookahead,
            parse_state,
            lex_mode,
            extra,
            hidden: self.grammar.is_hidden(symbol),
            has_error,
            error,
            children: children.into_boxed_slice(),
        }))
    }
}

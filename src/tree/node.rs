//! Immutable, reference-counted tree nodes.

use std::fmt;
use std::sync::Arc;

use text_size::TextSize;

use crate::errors::ErrorCode;
use crate::grammar::{LexModeId, StateId, Symbol};

/// A node of a syntax tree.
///
/// Nodes store lengths rather than offsets, so one node can sit at different
/// positions in different tree versions. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Node(pub(crate) Arc<NodeData>);

pub(crate) struct NodeData {
    pub symbol: Symbol,
    /// Skipped text before the node's first byte
    pub padding: TextSize,
    pub size: TextSize,
    /// Bytes examined past the node's end while it was built
    pub lookahead: u32,
    /// Parse state the node was built in (leaves: the state they were lexed in)
    pub parse_state: StateId,
    pub lex_mode: LexModeId,
    pub extra: bool,
    pub hidden: bool,
    pub has_error: bool,
    pub error: Option<ErrorCode>,
    pub children: Box<[Node]>,
}

impl Node {
    pub fn symbol(&self) -> Symbol {
        self.0.symbol
    }

    pub fn padding(&self) -> TextSize {
        self.0.padding
    }

    pub fn size(&self) -> TextSize {
        self.0.size
    }

    /// Padding plus size
    pub fn total_len(&self) -> TextSize {
        self.0.padding + self.0.size
    }

    pub fn lookahead(&self) -> u32 {
        self.0.lookahead
    }

    pub fn parse_state(&self) -> StateId {
        self.0.parse_state
    }

    pub fn lex_mode(&self) -> LexModeId {
        self.0.lex_mode
    }

    pub fn is_extra(&self) -> bool {
        self.0.extra
    }

    pub fn is_hidden(&self) -> bool {
        self.0.hidden
    }

    /// Is this node, or anything below it, an ERROR node?
    pub fn has_error(&self) -> bool {
        self.0.has_error
    }

    pub fn is_error(&self) -> bool {
        self.0.symbol == Symbol::ERROR
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.0.error
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    /// Same node, not just an equal one.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Equal kinds, lengths and children, ignoring identity and parser bookkeeping.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        if Node::ptr_eq(self, other) {
            return true;
        }
        self.symbol() == other.symbol()
            && self.padding() == other.padding()
            && self.size() == other.size()
            && self.is_extra() == other.is_extra()
            && self.children().len() == other.children().len()
            && self
                .children()
                .iter()
                .zip(other.children())
                .all(|(a, b)| a.structurally_eq(b))
    }

    /// Number of nodes in this subtree, itself included
    pub fn descendant_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::descendant_count)
            .sum::<usize>()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("symbol", &self.symbol().raw())
            .field("padding", &u32::from(self.padding()))
            .field("size", &u32::from(self.size()))
            .field("state", &self.parse_state());
        if self.is_extra() {
            s.field("extra", &true);
        }
        if !self.is_leaf() {
            s.field("children", &self.children());
        }
        s.finish()
    }
}

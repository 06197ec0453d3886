//! Syntax trees.
//!
//! A [`Tree`] is an immutable value: a root [`Node`] plus the grammar and
//! source it was parsed from. Nodes only know their lengths; [`NodeRef`]
//! adds the absolute offset while walking down from the root. Unchanged
//! subtrees are shared by reference between tree versions.

mod builder;
mod display;
mod node;
mod syntax;


use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use text_size::{TextRange, TextSize};

use crate::base::{LineIndex, Point};
use crate::errors::{ErrorCode, SyntaxError};
use crate::grammar::{Grammar, GrammarHandle, Symbol};

pub(crate) use builder::TreeBuilder;
pub use display::tree_to_string;
pub use node::Node;
pub use syntax::{GrammarLanguage, SyntaxElement, SyntaxNode, SyntaxToken};

/// The result of a parse.
#[derive(Clone)]
pub struct Tree {
    root: Node,
    grammar: GrammarHandle,
    source: Arc<[u8]>,
    partial: bool,
    /// Built on first use by the point queries
    lines: OnceCell<LineIndex>,
}

impl Tree {
    pub(crate) fn new(root: Node, grammar: GrammarHandle, source: Arc<[u8]>, partial: bool) -> Self {
        Self {
            root,
            grammar,
            source,
            partial,
            lines: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_node(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            node: &self.root,
            offset: TextSize::new(0),
        }
    }

    pub fn grammar(&self) -> &GrammarHandle {
        &self.grammar
    }

    /// Name of the grammar the tree was parsed with
    pub fn language(&self) -> &str {
        self.grammar.name()
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn len(&self) -> TextSize {
        self.root.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// `true` when the parse was cut short by its operation budget
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn has_error(&self) -> bool {
        self.root.has_error()
    }

    /// One diagnostic per outermost ERROR node, in source order.
    pub fn errors(&self) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        let mut stack = vec![self.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() {
                errors.push(self.describe_error(node));
            } else if node.node().has_error() {
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }
        errors
    }

    fn describe_error(&self, node: NodeRef<'_>) -> SyntaxError {
        let code = node.node().error_code().unwrap_or(ErrorCode::E0201);
        let first_leaf = node
            .descendants()
            .find(|d| d.node().is_leaf() && d.node().size() > TextSize::new(0));
        let message = match (code, first_leaf) {
            (ErrorCode::E0201, Some(leaf)) => format!("unexpected {}", leaf.describe()),
            _ => code.default_message().to_string(),
        };
        SyntaxError::new(message, node.byte_range(), code)
    }

    /// S-expression of kinds and leaf text, e.g. `(expr (num 1) + (num 2))`.
    pub fn to_sexp(&self) -> String {
        display::to_sexp(self)
    }

    /// Same shape, kinds and lengths, regardless of node sharing.
    pub fn structurally_eq(&self, other: &Tree) -> bool {
        self.root.structurally_eq(&other.root)
    }

    pub fn line_index(&self) -> &LineIndex {
        self.lines.get_or_init(|| LineIndex::new(&self.source))
    }

    pub fn point_at(&self, offset: TextSize) -> Point {
        self.line_index().point(offset)
    }

    /// Lossless rowan view of the tree, for UTF-8 sources.
    pub fn syntax(&self) -> Option<SyntaxNode> {
        syntax::build(self)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language())
            .field("len", &u32::from(self.len()))
            .field("root", &tree_to_string(self))
            .finish()
    }
}

/// A node at a known position in a tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    node: &'t Node,
    /// Absolute offset where the node's padding begins
    offset: TextSize,
}

impl<'t> NodeRef<'t> {
    pub fn node(&self) -> &'t Node {
        self.node
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn symbol(&self) -> Symbol {
        self.node.symbol()
    }

    pub fn kind(&self) -> &'t str {
        self.grammar().symbol_name(self.node.symbol())
    }

    pub fn is_visible(&self) -> bool {
        !self.node.is_hidden()
    }

    pub fn is_named(&self) -> bool {
        self.is_visible() && self.grammar().is_named(self.node.symbol())
    }

    pub fn is_error(&self) -> bool {
        self.node.is_error()
    }

    pub fn has_error(&self) -> bool {
        self.node.has_error()
    }

    pub fn is_extra(&self) -> bool {
        self.node.is_extra()
    }

    pub fn start_byte(&self) -> TextSize {
        self.offset + self.node.padding()
    }

    pub fn end_byte(&self) -> TextSize {
        self.offset + self.node.total_len()
    }

    /// Range of the node's text, without leading padding
    pub fn byte_range(&self) -> TextRange {
        TextRange::new(self.start_byte(), self.end_byte())
    }

    /// Range including leading padding
    pub fn total_range(&self) -> TextRange {
        TextRange::new(self.offset, self.end_byte())
    }

    pub fn start_point(&self) -> Point {
        self.tree.point_at(self.start_byte())
    }

    pub fn text(&self) -> &'t [u8] {
        &self.tree.source[usize::from(self.start_byte())..usize::from(self.end_byte())]
    }

    pub fn utf8_text(&self) -> Option<&'t str> {
        std::str::from_utf8(self.text()).ok()
    }

    pub fn child_count(&self) -> usize {
        self.node.children().len()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        self.children().nth(index)
    }

    /// Direct children, hidden ones included
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + use<'t> {
        let tree = self.tree;
        let mut offset = self.offset;
        self.node.children().iter().map(move |child| {
            let child_ref = NodeRef {
                tree,
                node: child,
                offset,
            };
            offset += child.total_len();
            child_ref
        })
    }

    /// Children with hidden nodes replaced by their own visible children
    pub fn visible_children(&self) -> Vec<NodeRef<'t>> {
        let mut out = Vec::new();
        self.collect_visible(&mut out);
        out
    }

    pub fn named_children(&self) -> Vec<NodeRef<'t>> {
        let mut out = self.visible_children();
        out.retain(NodeRef::is_named);
        out
    }

    /// Preorder walk of the subtree, starting with this node
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'t>> + use<'t> {
        let mut stack = vec![*self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let children: Vec<_> = next.children().collect();
            stack.extend(children.into_iter().rev());
            Some(next)
        })
    }

    /// Deepest visible node whose range contains `offset`
    pub fn descendant_for_byte(&self, offset: TextSize) -> Option<NodeRef<'t>> {
        if !self.byte_range().contains_inclusive(offset) {
            return None;
        }
        let deeper = self
            .visible_children()
            .into_iter()
            .filter(|child| child.node.size() > TextSize::new(0))
            .find_map(|child| child.descendant_for_byte(offset));
        Some(deeper.unwrap_or(*self))
    }

    fn collect_visible(&self, out: &mut Vec<NodeRef<'t>>) {
        for child in self.children() {
            if child.is_visible() {
                out.push(child);
            } else {
                child.collect_visible(out);
            }
        }
    }

    /// Short description for diagnostics: `'+'` for literals, the kind otherwise.
    pub(crate) fn describe(&self) -> String {
        if self.grammar().is_literal(self.symbol()) {
            format!("'{}'", self.kind())
        } else {
            self.kind().to_string()
        }
    }

    fn grammar(&self) -> &'t Grammar {
        &self.tree.grammar
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.byte_range())
    }
}

//! Lossless rowan view of a tree.
//!
//! Kinds are grammar [`Symbol`]s. Padding becomes [`Symbol::TRIVIA`] tokens
//! so the CST text is exactly the source text.

use rowan::{GreenNode, GreenNodeBuilder};
use text_size::TextSize;

use super::{Node, Tree};
use crate::grammar::Symbol;

impl From<rowan::SyntaxKind> for Symbol {
    fn from(raw: rowan::SyntaxKind) -> Self {
        Symbol(raw.0)
    }
}

impl From<Symbol> for rowan::SyntaxKind {
    fn from(symbol: Symbol) -> Self {
        rowan::SyntaxKind(symbol.raw())
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLanguage {}

impl rowan::Language for GrammarLanguage {
    type Kind = Symbol;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<GrammarLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<GrammarLanguage>;

pub(super) fn build(tree: &Tree) -> Option<SyntaxNode> {
    let source = std::str::from_utf8(tree.source()).ok()?;
    let mut builder = GreenNodeBuilder::new();
    let mut offset = TextSize::new(0);
    // The root always has at least the END leaf, so it opens a node
    emit(&mut builder, source, tree.root(), &mut offset)?;
    let green: GreenNode = builder.finish();
    Some(SyntaxNode::new_root(green))
}

fn emit(
    builder: &mut GreenNodeBuilder<'_>,
    source: &str,
    node: &Node,
    offset: &mut TextSize,
) -> Option<()> {
    if node.is_leaf() {
        let start = *offset;
        let text_start = start + node.padding();
        let end = text_start + node.size();
        if node.padding() > TextSize::new(0) {
            let padding = source.get(usize::from(start)..usize::from(text_start))?;
            builder.token(Symbol::TRIVIA.into(), padding);
        }
        let text = source.get(usize::from(text_start)..usize::from(end))?;
        builder.token(node.symbol().into(), text);
        *offset = end;
        return Some(());
    }

    builder.start_node(node.symbol().into());
    for child in node.children() {
        emit(builder, source, child, offset)?;
    }
    builder.finish_node();
    Some(())
}

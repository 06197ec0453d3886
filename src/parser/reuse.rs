//! Reuse of old subtrees during an incremental reparse.
//!
//! [`ReuseCursor`] walks the old tree in source order alongside the parser.
//! Offsets inside the cursor are old-tree offsets; they are mapped into the
//! new source with the edit before they are compared with the parser's
//! position.

use text_size::TextSize;

use crate::edit::InputEdit;
use crate::grammar::{LexModeId, Symbol};
use crate::lexer::Token;
use crate::tree::Node;

struct Frame<'t> {
    parent: &'t Node,
    index: usize,
    /// Old offset where the child at `index` starts
    offset: u32,
}

pub(crate) struct ReuseCursor<'t> {
    root: &'t Node,
    stack: Vec<Frame<'t>>,
    start: u32,
    old_end: u32,
    new_end: u32,
}

impl<'t> ReuseCursor<'t> {
    pub fn new(root: &'t Node, edit: &InputEdit) -> Self {
        Self {
            root,
            stack: vec![Frame {
                parent: root,
                index: 0,
                offset: 0,
            }],
            start: edit.start_byte.into(),
            old_end: edit.old_end_byte.into(),
            new_end: edit.new_end_byte.into(),
        }
    }

    /// New offset of a node spanning `[old_start, old_start + len)` in the
    /// old source with `lookahead` extra bytes examined, or `None` if the
    /// edit touched anything the node depended on.
    fn map(&self, old_start: u32, len: u32, lookahead: u32) -> Option<u32> {
        if old_start + len + lookahead <= self.start {
            Some(old_start)
        } else if old_start >= self.old_end {
            Some(old_start - self.old_end + self.new_end)
        } else {
            None
        }
    }

    fn current(&self) -> Option<(&'t Node, u32)> {
        let frame = self.stack.last()?;
        let parent: &'t Node = frame.parent;
        parent
            .children()
            .get(frame.index)
            .map(|child| (child, frame.offset))
    }

    /// Move past the current node.
    pub fn advance(&mut self) {
        while let Some(frame) = self.stack.last_mut() {
            let parent: &'t Node = frame.parent;
            if let Some(child) = parent.children().get(frame.index) {
                frame.offset += u32::from(child.total_len());
                frame.index += 1;
            }
            if frame.index < parent.children().len() {
                return;
            }
            self.stack.pop();
        }
    }

    /// Move to the first child of the current node, or past it if it has none.
    pub fn descend(&mut self) {
        match self.current() {
            Some((node, offset)) if !node.is_leaf() => self.stack.push(Frame {
                parent: node,
                index: 0,
                offset,
            }),
            _ => self.advance(),
        }
    }

    /// The old node starting exactly at `position` that the edit left
    /// untouched, if there is one.
    ///
    /// Nodes the edit touched, nodes already behind `position` and empty or
    /// erroneous nodes are broken down or skipped on the way.
    pub fn candidate(&mut self, position: TextSize) -> Option<Node> {
        let position = u32::from(position);
        loop {
            let (node, old_start) = self.current()?;
            let len = u32::from(node.total_len());
            match self.map(old_start, len, node.lookahead()) {
                None => self.descend(),
                Some(start) if start < position => {
                    if start + len <= position {
                        self.advance();
                    } else {
                        self.descend();
                    }
                }
                Some(start) if start > position => return None,
                Some(_) if len == 0 || node.has_error() => self.descend(),
                Some(_) => return Some(node.clone()),
            }
        }
    }

    /// Take the current candidate.
    ///
    /// Returns the lex mode the old parse lexed the following token in.
    /// Tokens are lexed before the reductions that complete a subtree, so
    /// after an internal node this is the mode of the state inside it, not
    /// of the state its goto leads to.
    pub fn accept(&mut self) -> Option<LexModeId> {
        let (node, old_start) = self.current()?;
        let end = old_start + u32::from(node.total_len());
        self.advance();
        following_leaf(self.root, end).map(Node::lex_mode)
    }

    /// The old leaf identical to a freshly lexed `token`, if there is one.
    ///
    /// Tokens next to an edit are always relexed because their lookahead
    /// touched it; when the text they cover did not change they get the old
    /// leaf back, keeping its identity.
    pub fn matching_leaf(&self, token: &Token) -> Option<Node> {
        let start = u32::from(token.offset);
        let end = u32::from(token.end());
        let old_start = if end <= self.start {
            start
        } else if start >= self.new_end {
            start - self.new_end + self.old_end
        } else {
            return None;
        };

        let leaf = leaf_at(self.root, old_start)?;
        let same = leaf.symbol() == token.symbol
            && leaf.padding() == token.padding
            && leaf.size() == token.len
            && leaf.lookahead() == token.lookahead
            && leaf.lex_mode() == token.lex_mode
            && !leaf.has_error();
        same.then(|| leaf.clone())
    }
}

/// The first leaf of `node` with any text.
pub(crate) fn first_leaf(node: &Node) -> Option<&Node> {
    if node.is_leaf() {
        return (node.total_len() > TextSize::new(0)).then_some(node);
    }
    node.children().iter().find_map(first_leaf)
}

/// The leaf that starts at `offset`, including the zero-width END leaf at
/// the very end.
fn following_leaf(root: &Node, offset: u32) -> Option<&Node> {
    leaf_at(root, offset).or_else(|| {
        root.children()
            .last()
            .filter(|end| end.symbol() == Symbol::END && u32::from(root.total_len()) == offset)
    })
}

/// The leaf whose padding starts exactly at `offset`.
fn leaf_at(root: &Node, offset: u32) -> Option<&Node> {
    let mut node = root;
    let mut start = 0u32;
    loop {
        if node.is_leaf() {
            return (start == offset).then_some(node);
        }
        let mut next = None;
        for child in node.children() {
            let len = u32::from(child.total_len());
            if len > 0 && offset < start + len {
                next = Some(child);
                break;
            }
            start += len;
        }
        node = next?;
    }
}

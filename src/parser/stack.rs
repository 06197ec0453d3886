//! The LR parse stack.

use text_size::TextSize;

use crate::grammar::StateId;
use crate::tree::Node;

pub(crate) struct StackEntry {
    /// State after pushing this entry
    pub state: StateId,
    pub node: Node,
    /// Absolute end offset of the node
    pub end: TextSize,
}

impl StackEntry {
    /// End of the region the node's parse depended on
    pub fn examined_end(&self) -> u32 {
        u32::from(self.end) + self.node.lookahead()
    }
}

/// Stack of (state, node) pairs above the implicit initial state 0.
#[derive(Default)]
pub(crate) struct ParseStack {
    entries: Vec<StackEntry>,
}

impl ParseStack {
    pub fn top_state(&self) -> StateId {
        self.entries.last().map_or(0, |entry| entry.state)
    }

    pub fn top_end(&self) -> TextSize {
        self.entries
            .last()
            .map_or(TextSize::new(0), |entry| entry.end)
    }

    pub fn top_is_extra(&self) -> bool {
        self.entries.last().is_some_and(|entry| entry.node.is_extra())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, state: StateId, node: Node, end: TextSize) {
        self.entries.push(StackEntry { state, node, end });
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    /// Pop the entries of a reduction of `count` symbols.
    ///
    /// Extras between the popped symbols go with them. Extras above the last
    /// symbol are returned separately so they can be pushed back on top of
    /// the reduced node.
    pub fn pop_for_reduce(&mut self, count: usize) -> (Vec<StackEntry>, Vec<StackEntry>) {
        let mut trailing = Vec::new();
        while self.top_is_extra() {
            trailing.extend(self.entries.pop());
        }
        trailing.reverse();

        let mut popped = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            if !entry.node.is_extra() {
                remaining -= 1;
            }
            popped.push(entry);
        }
        popped.reverse();
        (popped, trailing)
    }

    /// How many entries must be popped to expose a state satisfying `accepts`?
    pub fn depth_until(&self, limit: usize, accepts: impl Fn(StateId) -> bool) -> Option<usize> {
        let mut depth = 0;
        let mut index = self.entries.len();
        loop {
            let state = if index == 0 {
                0
            } else {
                self.entries[index - 1].state
            };
            if accepts(state) {
                return Some(depth);
            }
            if index == 0 || depth >= limit {
                return None;
            }
            index -= 1;
            depth += 1;
        }
    }

    /// Pop the top `count` entries, bottom-most first.
    pub fn pop_many(&mut self, count: usize) -> Vec<StackEntry> {
        let at = self.entries.len().saturating_sub(count);
        self.entries.split_off(at)
    }

    pub fn drain(&mut self) -> Vec<StackEntry> {
        std::mem::take(&mut self.entries)
    }
}

//! Parse actions, productions and the dense action/goto tables.

use super::symbol::{LexModeId, Precedence, ProductionId, StateId, Symbol, TokenSet};

/// Goto entry with no transition
pub(crate) const NO_STATE: StateId = StateId::MAX;

/// Parse table entry for a (state, terminal) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
    /// No valid action: error recovery takes over
    #[default]
    Recover,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Box<[Symbol]>,
    pub precedence: Option<Precedence>,
}

impl Production {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// A table conflict and how it was settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: Symbol,
    pub kind: ConflictKind,
    /// The action kept in the table (`Recover` for non-associative operators)
    pub chosen: Action,
    /// `true` when precedence settled the conflict, `false` for the shift/first-rule default
    pub by_precedence: bool,
}

/// Dense LR tables indexed by state.
#[derive(Debug, Clone)]
pub(crate) struct ParseTable {
    pub(crate) terminal_count: usize,
    pub(crate) nonterminal_count: usize,
    pub(crate) actions: Vec<Action>,
    pub(crate) gotos: Vec<StateId>,
    pub(crate) state_lex_modes: Vec<LexModeId>,
    pub(crate) lex_modes: Vec<TokenSet>,
}

impl ParseTable {
    pub(crate) fn state_count(&self) -> usize {
        self.state_lex_modes.len()
    }

    pub(crate) fn action(&self, state: StateId, terminal: Symbol) -> Action {
        if terminal.index() >= self.terminal_count {
            return Action::Recover;
        }
        self.actions
            .get(state as usize * self.terminal_count + terminal.index())
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn goto(&self, state: StateId, nonterminal: Symbol) -> Option<StateId> {
        let column = nonterminal.index().checked_sub(self.terminal_count)?;
        if column >= self.nonterminal_count {
            return None;
        }
        self.gotos
            .get(state as usize * self.nonterminal_count + column)
            .copied()
            .filter(|next| *next != NO_STATE)
    }
}

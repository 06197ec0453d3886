//! LALR(1) table construction.
//!
//! States are built from LR(1) kernels merged on their LR(0) core as they
//! are discovered; a state whose kernel lookaheads grow is queued again so
//! the new lookaheads propagate to its successors.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::error::GrammarError;
use super::symbol::{Assoc, Precedence, ProductionId, StateId, Symbol, SymbolInfo, TokenSet};
use super::table::{Action, Conflict, ConflictKind, NO_STATE, Production};

/// Everything table construction needs to know about a grammar.
pub(crate) struct LalrInput<'a> {
    pub symbols: &'a [SymbolInfo],
    pub terminal_count: usize,
    pub productions: &'a [Production],
    /// Indexed by terminal
    pub token_precedence: &'a [Option<Precedence>],
}

pub(crate) struct LalrTables {
    pub actions: Vec<Action>,
    pub gotos: Vec<StateId>,
    pub state_count: usize,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    production: u32,
    dot: u32,
}

struct LrState {
    kernel: Vec<Item>,
    lookaheads: Vec<TokenSet>,
}

struct Analysis<'a> {
    input: &'a LalrInput<'a>,
    nullable: Vec<bool>,
    first: Vec<TokenSet>,
    by_lhs: Vec<Vec<u32>>,
}

impl<'a> Analysis<'a> {
    fn new(input: &'a LalrInput<'a>) -> Self {
        let nonterminals = input.symbols.len() - input.terminal_count;
        let mut by_lhs = vec![Vec::new(); nonterminals];
        for (id, production) in input.productions.iter().enumerate() {
            by_lhs[production.lhs.index() - input.terminal_count].push(id as u32);
        }

        let mut analysis = Self {
            input,
            nullable: vec![false; nonterminals],
            first: vec![TokenSet::new(); nonterminals],
            by_lhs,
        };
        analysis.compute_nullable();
        analysis.compute_first();
        analysis
    }

    fn column(&self, symbol: Symbol) -> usize {
        symbol.index() - self.input.terminal_count
    }

    fn is_terminal(&self, symbol: Symbol) -> bool {
        symbol.index() < self.input.terminal_count
    }

    fn compute_nullable(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.input.productions {
                let column = self.column(production.lhs);
                if self.nullable[column] {
                    continue;
                }
                let nullable = production
                    .rhs
                    .iter()
                    .all(|s| !self.is_terminal(*s) && self.nullable[self.column(*s)]);
                if nullable {
                    self.nullable[column] = true;
                    changed = true;
                }
            }
        }
    }

    fn compute_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.input.productions {
                let first = self.first_of_sequence(&production.rhs, &TokenSet::new());
                let column = self.column(production.lhs);
                changed |= self.first[column].union_with(&first);
            }
        }
    }

    /// FIRST of `sequence` followed by the lookaheads in `tail`.
    fn first_of_sequence(&self, sequence: &[Symbol], tail: &TokenSet) -> TokenSet {
        let mut out = TokenSet::new();
        for &symbol in sequence {
            if self.is_terminal(symbol) {
                out.insert(symbol);
                return out;
            }
            let column = self.column(symbol);
            out.union_with(&self.first[column]);
            if !self.nullable[column] {
                return out;
            }
        }
        out.union_with(tail);
        out
    }

    fn closure(&self, state: &LrState) -> IndexMap<Item, TokenSet> {
        let mut items: IndexMap<Item, TokenSet> = state
            .kernel
            .iter()
            .copied()
            .zip(state.lookaheads.iter().cloned())
            .collect();
        let mut work: Vec<usize> = (0..items.len()).collect();

        while let Some(index) = work.pop() {
            let Some((item, lookahead)) = items
                .get_index(index)
                .map(|(item, lookahead)| (*item, lookahead.clone()))
            else {
                continue;
            };
            let production = &self.input.productions[item.production as usize];
            let dot = item.dot as usize;
            let Some(&next) = production.rhs.get(dot) else {
                continue;
            };
            if self.is_terminal(next) {
                continue;
            }
            let follow = self.first_of_sequence(&production.rhs[dot + 1..], &lookahead);

            for &candidate in &self.by_lhs[self.column(next)] {
                let item = Item {
                    production: candidate,
                    dot: 0,
                };
                match items.get_index_of(&item) {
                    Some(existing) => {
                        let grew = items
                            .get_index_mut(existing)
                            .is_some_and(|(_, set)| set.union_with(&follow));
                        if grew {
                            work.push(existing);
                        }
                    }
                    None => {
                        let (inserted, _) = items.insert_full(item, follow.clone());
                        work.push(inserted);
                    }
                }
            }
        }
        items
    }
}

pub(crate) fn build_tables(input: &LalrInput<'_>) -> Result<LalrTables, GrammarError> {
    let analysis = Analysis::new(input);
    let terminal_count = input.terminal_count;
    let nonterminal_count = input.symbols.len() - terminal_count;

    let mut states = vec![LrState {
        kernel: vec![Item {
            production: 0,
            dot: 0,
        }],
        lookaheads: vec![TokenSet::single(Symbol::END)],
    }];
    let mut index: FxHashMap<Vec<Item>, usize> = FxHashMap::default();
    index.insert(states[0].kernel.clone(), 0);
    let mut transitions: Vec<Vec<(Symbol, usize)>> = vec![Vec::new()];
    let mut queued = vec![true];
    let mut queue = VecDeque::from([0usize]);

    while let Some(current) = queue.pop_front() {
        queued[current] = false;
        let closure = analysis.closure(&states[current]);

        let mut successors: IndexMap<Symbol, Vec<(Item, TokenSet)>> = IndexMap::new();
        for (item, lookahead) in &closure {
            let production = &input.productions[item.production as usize];
            if let Some(&next) = production.rhs.get(item.dot as usize) {
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                successors
                    .entry(next)
                    .or_default()
                    .push((advanced, lookahead.clone()));
            }
        }

        let mut edges = Vec::with_capacity(successors.len());
        for (symbol, mut items) in successors {
            items.sort_by_key(|(item, _)| *item);
            let kernel: Vec<Item> = items.iter().map(|(item, _)| *item).collect();

            let target = match index.get(&kernel) {
                Some(&target) => {
                    let mut grew = false;
                    for (slot, (_, lookahead)) in items.iter().enumerate() {
                        grew |= states[target].lookaheads[slot].union_with(lookahead);
                    }
                    if grew && !queued[target] {
                        queued[target] = true;
                        queue.push_back(target);
                    }
                    target
                }
                None => {
                    let target = states.len();
                    if target >= NO_STATE as usize {
                        return Err(GrammarError::Limit("parse states"));
                    }
                    index.insert(kernel.clone(), target);
                    states.push(LrState {
                        kernel,
                        lookaheads: items.into_iter().map(|(_, lookahead)| lookahead).collect(),
                    });
                    transitions.push(Vec::new());
                    queued.push(true);
                    queue.push_back(target);
                    target
                }
            };
            edges.push((symbol, target));
        }
        transitions[current] = edges;
    }

    let state_count = states.len();
    let mut actions = vec![Action::Recover; state_count * terminal_count];
    let mut gotos = vec![NO_STATE; state_count * nonterminal_count];
    let mut conflicts = Vec::new();
    // Slots a non-associative operator turned into errors stay errors
    let mut rejected = vec![false; actions.len()];
    let resolver = Resolver { input };

    for (state, lr_state) in states.iter().enumerate() {
        for &(symbol, target) in &transitions[state] {
            if symbol.index() < terminal_count {
                actions[state * terminal_count + symbol.index()] = Action::Shift(target as StateId);
            } else {
                gotos[state * nonterminal_count + symbol.index() - terminal_count] =
                    target as StateId;
            }
        }

        for (item, lookahead) in analysis.closure(lr_state) {
            let production = &input.productions[item.production as usize];
            if item.dot as usize != production.len() {
                continue;
            }
            for terminal in lookahead.iter() {
                let cell = state * terminal_count + terminal.index();
                if rejected[cell] {
                    continue;
                }
                let slot = &mut actions[cell];
                let proposed = if item.production == 0 {
                    Action::Accept
                } else {
                    Action::Reduce(item.production as ProductionId)
                };
                let (chosen, conflict) =
                    resolver.resolve(state as StateId, terminal, *slot, proposed);
                *slot = chosen;
                rejected[cell] = conflict.is_some() && chosen == Action::Recover;
                if let Some(conflict) = conflict {
                    conflicts.push(conflict);
                }
            }
        }
    }

    debug!(
        states = state_count,
        conflicts = conflicts.len(),
        "built LALR(1) tables"
    );

    Ok(LalrTables {
        actions,
        gotos,
        state_count,
        conflicts,
    })
}

struct Resolver<'a> {
    input: &'a LalrInput<'a>,
}

impl Resolver<'_> {
    fn resolve(
        &self,
        state: StateId,
        lookahead: Symbol,
        existing: Action,
        proposed: Action,
    ) -> (Action, Option<Conflict>) {
        let conflict = |kind, chosen, by_precedence| Conflict {
            state,
            lookahead,
            kind,
            chosen,
            by_precedence,
        };

        match (existing, proposed) {
            (Action::Recover, _) => (proposed, None),
            (Action::Shift(_), Action::Reduce(production)) => {
                let (chosen, by_precedence) = self.shift_or_reduce(existing, production, lookahead);
                let record = conflict(ConflictKind::ShiftReduce, chosen, by_precedence);
                self.log(&record);
                (chosen, Some(record))
            }
            (Action::Reduce(kept), Action::Reduce(other)) => {
                let chosen = Action::Reduce(kept.min(other));
                let record = conflict(ConflictKind::ReduceReduce, chosen, false);
                self.log(&record);
                (chosen, Some(record))
            }
            _ => {
                let record = conflict(ConflictKind::ReduceReduce, existing, false);
                self.log(&record);
                (existing, Some(record))
            }
        }
    }

    /// Yacc rules: compare the production's precedence with the token's,
    /// fall back to associativity on a tie, shift when either is missing.
    fn shift_or_reduce(
        &self,
        shift: Action,
        production: ProductionId,
        lookahead: Symbol,
    ) -> (Action, bool) {
        let rule = self.input.productions[production as usize].precedence;
        let token = self.input.token_precedence[lookahead.index()];
        match (rule, token) {
            (Some(rule), Some(token)) if rule.level > token.level => {
                (Action::Reduce(production), true)
            }
            (Some(rule), Some(token)) if rule.level < token.level => (shift, true),
            (Some(_), Some(token)) => match token.assoc {
                Assoc::Left => (Action::Reduce(production), true),
                Assoc::Right => (shift, true),
                Assoc::NonAssoc => (Action::Recover, true),
            },
            _ => (shift, false),
        }
    }

    fn log(&self, conflict: &Conflict) {
        let name = |symbol: Symbol| self.input.symbols[symbol.index()].name.as_str();
        debug!(
            state = conflict.state,
            lookahead = name(conflict.lookahead),
            kind = ?conflict.kind,
            chosen = ?conflict.chosen,
            by_precedence = conflict.by_precedence,
            "resolved table conflict"
        );
    }
}

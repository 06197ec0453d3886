//! Grammar definitions and their generated tables.
//!
//! A [`Grammar`] is built once from a [`GrammarBuilder`] and is immutable
//! afterwards. It owns:
//! - the symbol table (terminals first, then rules)
//! - the LALR(1) action and goto tables
//! - the lexical automaton and the per-state lex modes
//!
//! Grammars are shared as [`GrammarHandle`]s and looked up by name through
//! the [`registry`].

mod builder;
mod error;
mod lalr;
mod lexical;
pub mod registry;
mod symbol;
mod table;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

pub use builder::{GrammarBuilder, ProductionSpec, Sym, is_valid_name};
pub use error::GrammarError;
pub use lexical::{LexTable, TokenMatch};
pub use registry::{load_grammar, register_grammar, registered_grammars};
pub use symbol::{
    Assoc, Extra, LexModeId, Precedence, ProductionId, StateId, Symbol, SymbolInfo, SymbolKind,
    TokenSet,
};
pub use table::{Action, Conflict, ConflictKind, Production};

use builder::TokenSource;
use lalr::LalrInput;
use lexical::TokenPattern;
use table::ParseTable;

/// Shared, immutable grammar
pub type GrammarHandle = Arc<Grammar>;

pub struct Grammar {
    name: SmolStr,
    symbols: Vec<SymbolInfo>,
    terminal_count: usize,
    productions: Vec<Production>,
    start: Symbol,
    word: Option<Symbol>,
    keywords: FxHashMap<Box<[u8]>, Symbol>,
    lexical: LexTable,
    table: ParseTable,
    conflicts: Vec<Conflict>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    pub fn symbol_info(&self, symbol: Symbol) -> Option<&SymbolInfo> {
        self.symbols.get(symbol.index())
    }

    /// Display name of a symbol; unknown symbols print as `"?"`.
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        self.symbol_info(symbol).map_or("?", |info| info.name.as_str())
    }

    /// Find a visible symbol by name. Rules win over tokens of the same name.
    pub fn symbol_for_name(&self, name: &str) -> Option<Symbol> {
        let mut found = None;
        for (index, info) in self.symbols.iter().enumerate() {
            if info.name == name {
                found = Some(Symbol(index as u16));
                if info.kind == SymbolKind::Rule {
                    break;
                }
            }
        }
        found
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        symbol.index() < self.terminal_count
    }

    pub fn is_hidden(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol).is_none_or(|info| info.hidden)
    }

    pub fn is_named(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol).is_some_and(SymbolInfo::is_named)
    }

    pub fn extra(&self, symbol: Symbol) -> Extra {
        self.symbol_info(symbol)
            .map_or(Extra::None, |info| info.extra)
    }

    pub fn is_literal(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol)
            .is_some_and(|info| info.kind == SymbolKind::Literal)
    }

    /// The user start rule
    pub fn start_symbol(&self) -> Symbol {
        self.start
    }

    pub fn word_token(&self) -> Option<Symbol> {
        self.word
    }

    /// Keyword literal whose text is exactly `text`, if any.
    pub fn keyword(&self, text: &[u8]) -> Option<Symbol> {
        self.keywords.get(text).copied()
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id as usize)
    }

    pub fn state_count(&self) -> usize {
        self.table.state_count()
    }

    pub fn action(&self, state: StateId, terminal: Symbol) -> Action {
        self.table.action(state, terminal)
    }

    pub fn goto(&self, state: StateId, nonterminal: Symbol) -> Option<StateId> {
        self.table.goto(state, nonterminal)
    }

    /// Lex mode the lexer runs in while the parser sits in `state`.
    pub fn lex_mode(&self, state: StateId) -> LexModeId {
        self.table
            .state_lex_modes
            .get(state as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn lex_mode_count(&self) -> usize {
        self.table.lex_modes.len()
    }

    /// Terminals valid in a lex mode, extras included.
    pub fn lex_mode_tokens(&self, mode: LexModeId) -> Option<&TokenSet> {
        self.table.lex_modes.get(mode as usize)
    }

    pub fn lexical(&self) -> &LexTable {
        &self.lexical
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub(crate) fn from_builder(builder: GrammarBuilder) -> Result<Self, GrammarError> {
        if let Some(error) = builder.error.clone() {
            return Err(error);
        }
        let start_rule = builder
            .start
            .ok_or_else(|| GrammarError::MissingStart(builder.name.clone()))?;

        let terminal_count = Symbol::RESERVED as usize + builder.terminals.len();
        let total = terminal_count + 1 + builder.rules.len();
        if total >= u16::MAX as usize {
            return Err(GrammarError::Limit("symbols"));
        }
        let resolve = |sym: Sym| -> Symbol {
            if sym.terminal {
                Symbol(Symbol::RESERVED + sym.index)
            } else {
                Symbol((terminal_count + 1) as u16 + sym.index)
            }
        };

        let mut symbols = vec![
            SymbolInfo::new("end", SymbolKind::End, Extra::None),
            SymbolInfo::new("ERROR", SymbolKind::Error, Extra::None),
            SymbolInfo::new("trivia", SymbolKind::Trivia, Extra::None),
        ];
        let mut token_precedence = vec![None; terminal_count];
        let mut patterns = Vec::with_capacity(builder.terminals.len());
        for (index, def) in builder.terminals.iter().enumerate() {
            let symbol = Symbol(Symbol::RESERVED + index as u16);
            let (kind, regex, literal) = match &def.source {
                TokenSource::Literal(text) => {
                    (SymbolKind::Literal, regex_syntax::escape(text), true)
                }
                TokenSource::Pattern(regex) => (SymbolKind::Pattern, regex.clone(), false),
            };
            symbols.push(SymbolInfo::new(def.name.clone(), kind, def.extra));
            token_precedence[symbol.index()] = def.precedence;
            patterns.push(TokenPattern {
                symbol,
                name: def.name.clone(),
                regex,
                literal,
            });
        }

        symbols.push(SymbolInfo::new("_start", SymbolKind::Rule, Extra::None));
        for name in &builder.rules {
            symbols.push(SymbolInfo::new(name.clone(), SymbolKind::Rule, Extra::None));
        }

        let augmented = Symbol(terminal_count as u16);
        let start = resolve(start_rule);
        let mut productions = vec![Production {
            lhs: augmented,
            rhs: Box::new([start]),
            precedence: None,
        }];
        let mut has_production = vec![false; builder.rules.len()];
        for def in &builder.productions {
            has_production[def.lhs.index as usize] = true;
            let rhs: Box<[Symbol]> = def.rhs.iter().map(|s| resolve(*s)).collect();
            let precedence = def.precedence.or_else(|| {
                rhs.iter()
                    .rev()
                    .filter(|s| s.index() < terminal_count)
                    .find_map(|s| token_precedence[s.index()])
            });
            productions.push(Production {
                lhs: resolve(def.lhs),
                rhs,
                precedence,
            });
        }
        if productions.len() > ProductionId::MAX as usize {
            return Err(GrammarError::Limit("productions"));
        }
        if let Some(empty) = has_production.iter().position(|has| !has) {
            return Err(GrammarError::EmptyRule(builder.rules[empty].clone()));
        }

        let lexical = LexTable::build(&patterns)?;
        let tables = lalr::build_tables(&LalrInput {
            symbols: &symbols,
            terminal_count,
            productions: &productions,
            token_precedence: &token_precedence,
        })?;
        let (state_lex_modes, lex_modes) =
            lex_modes(&symbols, terminal_count, tables.state_count, &tables.actions);

        let word = builder.word.map(resolve);
        let mut keywords = FxHashMap::default();
        if let Some(word) = word {
            for (def, pattern) in builder.terminals.iter().zip(&patterns) {
                let TokenSource::Literal(text) = &def.source else {
                    continue;
                };
                if lexical.matches_whole(word, text.as_bytes()) {
                    keywords.insert(Box::from(text.as_bytes()), pattern.symbol);
                }
            }
        }

        debug!(
            grammar = %builder.name,
            symbols = symbols.len(),
            states = tables.state_count,
            lex_modes = lex_modes.len(),
            keywords = keywords.len(),
            "built grammar"
        );

        let nonterminal_count = symbols.len() - terminal_count;
        Ok(Self {
            name: builder.name,
            symbols,
            terminal_count,
            productions,
            start,
            word,
            keywords,
            lexical,
            table: ParseTable {
                terminal_count,
                nonterminal_count,
                actions: tables.actions,
                gotos: tables.gotos,
                state_lex_modes,
                lex_modes,
            },
            conflicts: tables.conflicts,
        })
    }
}

/// Valid-token set of every state, deduplicated into lex modes.
fn lex_modes(
    symbols: &[SymbolInfo],
    terminal_count: usize,
    state_count: usize,
    actions: &[Action],
) -> (Vec<LexModeId>, Vec<TokenSet>) {
    let always: TokenSet = symbols[..terminal_count]
        .iter()
        .enumerate()
        .filter(|(_, info)| info.extra != Extra::None)
        .map(|(index, _)| Symbol(index as u16))
        .collect();

    let mut modes: Vec<TokenSet> = Vec::new();
    let mut index: FxHashMap<TokenSet, LexModeId> = FxHashMap::default();
    let mut per_state = Vec::with_capacity(state_count);
    for state in 0..state_count {
        let mut valid = always.clone();
        let row = &actions[state * terminal_count..(state + 1) * terminal_count];
        for (terminal, action) in row.iter().enumerate() {
            if *action != Action::Recover {
                valid.insert(Symbol(terminal as u16));
            }
        }
        let valid = valid.normalized();
        let mode = *index.entry(valid.clone()).or_insert_with(|| {
            modes.push(valid);
            (modes.len() - 1) as LexModeId
        });
        per_state.push(mode);
    }
    (per_state, modes)
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("symbols", &self.symbols.len())
            .field("productions", &self.productions.len())
            .field("states", &self.state_count())
            .field("lex_modes", &self.lex_mode_count())
            .finish()
    }
}

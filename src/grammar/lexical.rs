//! Lexical automaton shared by every lex mode.
//!
//! All terminals are compiled into a single anchored DFA that reports every
//! pattern matching at each prefix. Lex modes filter those matches afterwards,
//! so one automaton serves every parse state.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};
use smol_str::SmolStr;

use super::error::GrammarError;
use super::symbol::Symbol;

/// A terminal handed to the automaton builder
pub(crate) struct TokenPattern {
    pub symbol: Symbol,
    pub name: SmolStr,
    /// Regex source; literals are escaped before they get here
    pub regex: String,
    pub literal: bool,
}

/// One terminal matching the input from the scan offset up to `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    pub symbol: Symbol,
    pub end: usize,
    pub literal: bool,
}

pub struct LexTable {
    dfa: dense::DFA<Vec<u32>>,
    symbols: Vec<Symbol>,
    literal: Vec<bool>,
}

impl LexTable {
    pub(crate) fn build(patterns: &[TokenPattern]) -> Result<Self, GrammarError> {
        for pattern in patterns {
            regex_syntax::Parser::new()
                .parse(&pattern.regex)
                .map_err(|err| GrammarError::InvalidPattern {
                    name: pattern.name.clone(),
                    message: err.to_string(),
                })?;
        }

        let sources: Vec<&str> = patterns.iter().map(|p| p.regex.as_str()).collect();
        let dfa = dense::Builder::new()
            .configure(
                dense::Config::new()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored),
            )
            .build_many(&sources)
            .map_err(|err| GrammarError::Lexer(err.to_string()))?;

        let table = Self {
            dfa,
            symbols: patterns.iter().map(|p| p.symbol).collect(),
            literal: patterns.iter().map(|p| p.literal).collect(),
        };

        let mut matches = Vec::new();
        table.walk(b"", 0, &mut matches);
        if let Some(empty) = matches.first() {
            let name = patterns
                .iter()
                .find(|p| p.symbol == empty.symbol)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            return Err(GrammarError::EmptyToken(name));
        }

        Ok(table)
    }

    /// Collect every non-empty match starting at `offset` into `out`.
    ///
    /// Returns the end of the examined region: one past the last byte the
    /// automaton looked at, where reading end of input counts as a byte.
    pub fn scan(&self, input: &[u8], offset: usize, out: &mut Vec<TokenMatch>) -> usize {
        let examined = self.walk(input, offset, out);
        out.retain(|m| m.end > offset);
        examined
    }

    /// Does `symbol` match exactly the whole of `text`?
    pub fn matches_whole(&self, symbol: Symbol, text: &[u8]) -> bool {
        let mut matches = Vec::new();
        self.walk(text, 0, &mut matches);
        matches
            .iter()
            .any(|m| m.symbol == symbol && m.end == text.len())
    }

    fn walk(&self, input: &[u8], offset: usize, out: &mut Vec<TokenMatch>) -> usize {
        let rest = input.get(offset..).unwrap_or_default();
        let start = Input::new(rest).anchored(Anchored::Yes);
        let Ok(mut state) = self.dfa.start_state_forward(&start) else {
            return offset + 1;
        };

        // Match states are reported one byte late: entering a match state
        // after byte `i` means a match ending at `i`.
        for (i, &byte) in rest.iter().enumerate() {
            state = self.dfa.next_state(state, byte);
            if self.dfa.is_special_state(state) {
                if self.dfa.is_match_state(state) {
                    self.push_matches(state, offset + i, out);
                } else if self.dfa.is_dead_state(state) || self.dfa.is_quit_state(state) {
                    return offset + i + 1;
                }
            }
        }

        state = self.dfa.next_eoi_state(state);
        if self.dfa.is_match_state(state) {
            self.push_matches(state, input.len(), out);
        }
        input.len() + 1
    }

    fn push_matches(
        &self,
        state: regex_automata::util::primitives::StateID,
        end: usize,
        out: &mut Vec<TokenMatch>,
    ) {
        for index in 0..self.dfa.match_len(state) {
            let pattern = self.dfa.match_pattern(state, index).as_usize();
            out.push(TokenMatch {
                symbol: self.symbols[pattern],
                end,
                literal: self.literal[pattern],
            });
        }
    }
}

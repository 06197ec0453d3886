//! Table-driven lexer.
//!
//! Tokens are scanned with the grammar's lexical automaton. The lex mode
//! passed to [`Lexer::next_token`] restricts which terminals are acceptable,
//! so the same text can lex differently depending on the parse state.

use text_size::{TextRange, TextSize};

use crate::grammar::{Extra, Grammar, LexModeId, Symbol, TokenMatch};

/// A token with its padding, size and lexing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    /// Where scanning started; skipped padding begins here
    pub offset: TextSize,
    pub padding: TextSize,
    pub len: TextSize,
    /// Bytes examined past the end of the token
    pub lookahead: u32,
    pub lex_mode: LexModeId,
}

impl Token {
    /// Range of the token text, without padding
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset + self.padding, self.len)
    }

    pub fn total_len(&self) -> TextSize {
        self.padding + self.len
    }

    pub fn end(&self) -> TextSize {
        self.offset + self.total_len()
    }

    pub fn is_end(&self) -> bool {
        self.symbol == Symbol::END
    }
}

/// Lexer over one source buffer; can be repositioned anywhere.
pub struct Lexer<'a> {
    grammar: &'a Grammar,
    input: &'a [u8],
    cursor: usize,
    matches: Vec<TokenMatch>,
}

impl<'a> Lexer<'a> {
    pub fn new(grammar: &'a Grammar, input: &'a [u8]) -> Self {
        Self {
            grammar,
            input,
            cursor: 0,
            matches: Vec::new(),
        }
    }

    pub fn position(&self) -> TextSize {
        TextSize::new(self.cursor as u32)
    }

    /// Move the cursor; offsets past the end clamp to the end.
    pub fn seek(&mut self, offset: TextSize) {
        self.cursor = usize::from(offset).min(self.input.len());
    }

    /// Scan the next token in `mode` and advance past it.
    ///
    /// Never fails: unmatchable text comes back as an [`Symbol::ERROR`]
    /// token and end of input as a zero-length [`Symbol::END`] token.
    pub fn next_token(&mut self, mode: LexModeId) -> Token {
        let start = self.cursor;
        let mut pos = start;
        let mut examined = start;

        loop {
            if pos >= self.input.len() {
                examined = examined.max(self.input.len() + 1);
                return self.finish(Symbol::END, start, pos, pos, examined, mode);
            }

            self.matches.clear();
            let scanned = self.grammar.lexical().scan(self.input, pos, &mut self.matches);
            examined = examined.max(scanned);

            match self.select(mode) {
                Some(found) if self.grammar.extra(found.symbol) == Extra::Skip => {
                    pos = found.end;
                }
                Some(found) => {
                    let symbol = self.extract_keyword(found.symbol, pos, found.end);
                    return self.finish(symbol, start, pos, found.end, examined, mode);
                }
                None => {
                    let error_start = pos;
                    pos = self.skip_unmatchable(pos, &mut examined);
                    return self.finish(Symbol::ERROR, start, error_start, pos, examined, mode);
                }
            }
        }
    }

    fn finish(
        &mut self,
        symbol: Symbol,
        start: usize,
        token_start: usize,
        end: usize,
        examined: usize,
        lex_mode: LexModeId,
    ) -> Token {
        self.cursor = end;
        Token {
            symbol,
            offset: size(start),
            padding: size(token_start - start),
            len: size(end - token_start),
            lookahead: examined.saturating_sub(end) as u32,
            lex_mode,
        }
    }

    /// Longest match valid in `mode`, else the longest match of any terminal.
    fn select(&self, mode: LexModeId) -> Option<TokenMatch> {
        let valid = self.grammar.lex_mode_tokens(mode);
        longest(
            self.matches
                .iter()
                .filter(|m| valid.is_some_and(|set| set.contains(m.symbol))),
        )
        .or_else(|| longest(self.matches.iter()))
    }

    fn extract_keyword(&self, symbol: Symbol, start: usize, end: usize) -> Symbol {
        if self.grammar.word_token() != Some(symbol) {
            return symbol;
        }
        self.grammar
            .keyword(&self.input[start..end])
            .unwrap_or(symbol)
    }

    /// Advance over characters until some terminal matches again.
    fn skip_unmatchable(&mut self, mut pos: usize, examined: &mut usize) -> usize {
        pos += char_len(self.input, pos);
        while pos < self.input.len() {
            self.matches.clear();
            let scanned = self.grammar.lexical().scan(self.input, pos, &mut self.matches);
            *examined = (*examined).max(scanned);
            if !self.matches.is_empty() {
                break;
            }
            pos += char_len(self.input, pos);
        }
        pos
    }
}

/// Maximal munch; equal lengths prefer literals, then the earlier terminal.
fn longest<'m>(candidates: impl Iterator<Item = &'m TokenMatch>) -> Option<TokenMatch> {
    candidates
        .max_by(|a, b| {
            a.end
                .cmp(&b.end)
                .then(a.literal.cmp(&b.literal))
                .then(b.symbol.cmp(&a.symbol))
        })
        .copied()
}

fn char_len(input: &[u8], pos: usize) -> usize {
    let len = match input[pos] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    };
    len.min(input.len() - pos)
}

fn size(value: usize) -> TextSize {
    TextSize::new(value as u32)
}

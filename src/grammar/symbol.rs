//! Grammar symbols and terminal sets.

use std::fmt;

use smol_str::SmolStr;

/// Parse state identifier
pub type StateId = u16;

/// Lex mode identifier: the lexer state a token is scanned in
pub type LexModeId = u16;

/// Production identifier
pub type ProductionId = u16;

/// A grammar symbol (the kind tag of tokens and nodes).
///
/// Terminals come first, starting with the reserved [`Symbol::END`],
/// [`Symbol::ERROR`] and [`Symbol::TRIVIA`]; nonterminals follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub(crate) u16);

impl Symbol {
    /// End of input
    pub const END: Symbol = Symbol(0);
    /// Unrecognized input and error nodes
    pub const ERROR: Symbol = Symbol(1);
    /// Padding text in the lossless CST view
    pub const TRIVIA: Symbol = Symbol(2);

    pub(crate) const RESERVED: u16 = 3;

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operator associativity used to resolve shift/reduce conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    /// Equal precedence is a syntax error (the table entry is removed)
    NonAssoc,
}

/// Precedence level plus associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub level: i32,
    pub assoc: Assoc,
}

impl Precedence {
    pub fn new(level: i32, assoc: Assoc) -> Self {
        Self { level, assoc }
    }
}

/// How a terminal behaves between other tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Extra {
    /// Ordinary token
    #[default]
    None,
    /// Skipped as padding (whitespace)
    Skip,
    /// Allowed anywhere, kept in the tree as a leaf (comments)
    Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    End,
    Error,
    Trivia,
    /// Fixed-text token such as `"+"` or a keyword
    Literal,
    /// Regex token such as `identifier`
    Pattern,
    /// Nonterminal
    Rule,
}

/// Static description of a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub extra: Extra,
    /// Hidden symbols are spliced into their parent in printed trees
    pub hidden: bool,
}

impl SymbolInfo {
    pub(crate) fn new(name: impl Into<SmolStr>, kind: SymbolKind, extra: Extra) -> Self {
        let name = name.into();
        let hidden = match kind {
            SymbolKind::End | SymbolKind::Trivia => true,
            SymbolKind::Error | SymbolKind::Literal => false,
            SymbolKind::Pattern | SymbolKind::Rule => name.starts_with('_') || extra == Extra::Skip,
        };
        Self {
            name,
            kind,
            extra,
            hidden,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind != SymbolKind::Rule
    }

    /// Named symbols print as `(name ...)`, anonymous ones as their text
    pub fn is_named(&self) -> bool {
        !matches!(self.kind, SymbolKind::Literal | SymbolKind::End | SymbolKind::Trivia)
    }
}

/// A set of terminals, stored as a bitset.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenSet {
    words: Vec<u64>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(symbol: Symbol) -> Self {
        let mut set = Self::new();
        set.insert(symbol);
        set
    }

    /// Insert a terminal; returns `true` if it was not present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        let (word, bit) = (symbol.index() / 64, symbol.index() % 64);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let added = self.words[word] & mask == 0;
        self.words[word] |= mask;
        added
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        let (word, bit) = (symbol.index() / 64, symbol.index() % 64);
        self.words
            .get(word)
            .is_some_and(|w| w & (1u64 << bit) != 0)
    }

    /// Union `other` into `self`; returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &TokenSet) -> bool {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.words.iter().enumerate().flat_map(|(i, word)| {
            (0..64)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| Symbol((i * 64 + bit) as u16))
        })
    }

    /// Canonical form: trailing zero words trimmed, so equal sets hash equally.
    pub(crate) fn normalized(mut self) -> Self {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
        self
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.0)).finish()
    }
}

impl FromIterator<Symbol> for TokenSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = Self::new();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}

//! Programmatic grammar definition.

use rustc_hash::FxHashMap;
use smol_str::{SmolStr, format_smolstr};

use super::error::GrammarError;
use super::symbol::{Assoc, Extra, Precedence};
use super::Grammar;

/// Handle to a token or rule declared on a [`GrammarBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym {
    pub(crate) index: u16,
    pub(crate) terminal: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum TokenSource {
    Literal(String),
    Pattern(String),
}

#[derive(Debug, Clone)]
pub(crate) struct TerminalDef {
    pub name: SmolStr,
    pub source: TokenSource,
    pub extra: Extra,
    pub precedence: Option<Precedence>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProductionDef {
    pub lhs: Sym,
    pub rhs: Vec<Sym>,
    pub precedence: Option<Precedence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AuxKind {
    Repeat,
    Repeat1,
    Optional,
}

/// Adjusts the production just added with [`GrammarBuilder::production`].
pub struct ProductionSpec<'b> {
    def: &'b mut ProductionDef,
}

impl ProductionSpec<'_> {
    pub fn prec(self, level: i32) -> Self {
        self.with(Precedence::new(level, Assoc::NonAssoc))
    }

    pub fn prec_left(self, level: i32) -> Self {
        self.with(Precedence::new(level, Assoc::Left))
    }

    pub fn prec_right(self, level: i32) -> Self {
        self.with(Precedence::new(level, Assoc::Right))
    }

    fn with(self, precedence: Precedence) -> Self {
        self.def.precedence = Some(precedence);
        self
    }
}

/// Builds a [`Grammar`] from tokens and BNF productions.
///
/// ```
/// use heptagon::grammar::{Assoc, GrammarBuilder};
///
/// let mut g = GrammarBuilder::new("sum");
/// let num = g.pattern("num", r"\d+");
/// let plus = g.literal("+");
/// g.precedence(1, Assoc::Left, &[plus]);
/// let sum = g.rule("sum");
/// g.production(sum, &[sum, plus, sum]);
/// g.production(sum, &[num]);
/// g.start(sum);
/// let grammar = g.build().unwrap();
/// assert_eq!(grammar.name(), "sum");
/// ```
#[derive(Debug)]
pub struct GrammarBuilder {
    pub(crate) name: SmolStr,
    pub(crate) terminals: Vec<TerminalDef>,
    pub(crate) rules: Vec<SmolStr>,
    pub(crate) productions: Vec<ProductionDef>,
    pub(crate) start: Option<Sym>,
    pub(crate) word: Option<Sym>,
    literals: FxHashMap<String, Sym>,
    names: FxHashMap<SmolStr, Sym>,
    aux: FxHashMap<(AuxKind, Sym), Sym>,
    skips: usize,
    pub(crate) error: Option<GrammarError>,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            terminals: Vec::new(),
            rules: Vec::new(),
            productions: Vec::new(),
            start: None,
            word: None,
            literals: FxHashMap::default(),
            names: FxHashMap::default(),
            aux: FxHashMap::default(),
            skips: 0,
            error: None,
        }
    }

    /// A fixed-text token. Declaring the same text twice yields the same handle.
    pub fn literal(&mut self, text: &str) -> Sym {
        if let Some(sym) = self.literals.get(text) {
            return *sym;
        }
        if text.is_empty() {
            self.fail(GrammarError::EmptyLiteral);
        }
        let sym = self.push_terminal(TerminalDef {
            name: SmolStr::new(text),
            source: TokenSource::Literal(text.to_string()),
            extra: Extra::None,
            precedence: None,
        });
        self.literals.insert(text.to_string(), sym);
        sym
    }

    /// A regex token. Names starting with `_` are hidden.
    pub fn pattern(&mut self, name: &str, regex: &str) -> Sym {
        self.check_name(name);
        let sym = self.push_terminal(TerminalDef {
            name: SmolStr::new(name),
            source: TokenSource::Pattern(regex.to_string()),
            extra: Extra::None,
            precedence: None,
        });
        self.declare(name, sym);
        sym
    }

    /// Text matching `regex` is skipped between tokens.
    pub fn skip(&mut self, regex: &str) -> Sym {
        let name = format_smolstr!("_skip{}", self.skips);
        self.skips += 1;
        self.push_terminal(TerminalDef {
            name,
            source: TokenSource::Pattern(regex.to_string()),
            extra: Extra::Skip,
            precedence: None,
        })
    }

    /// Allow `token` anywhere; it stays in the tree as a leaf.
    pub fn extra(&mut self, token: Sym) {
        match self.terminal_mut(token) {
            Some(def) => def.extra = Extra::Node,
            None => {
                let name = self.sym_name(token);
                self.fail(GrammarError::NotATerminal(name));
            }
        }
    }

    /// Keyword extraction: literals matched by `token` lex as themselves.
    pub fn word(&mut self, token: Sym) {
        if !token.terminal {
            let name = self.sym_name(token);
            self.fail(GrammarError::NotATerminal(name));
        }
        self.word = Some(token);
    }

    /// Assign a precedence level to operator tokens.
    pub fn precedence(&mut self, level: i32, assoc: Assoc, tokens: &[Sym]) {
        for &token in tokens {
            match self.terminal_mut(token) {
                Some(def) => def.precedence = Some(Precedence::new(level, assoc)),
                None => {
                    let name = self.sym_name(token);
                    self.fail(GrammarError::NotATerminal(name));
                }
            }
        }
    }

    /// Declare a rule, or look up one declared earlier.
    pub fn rule(&mut self, name: &str) -> Sym {
        if let Some(sym) = self.names.get(name).copied() {
            if sym.terminal {
                self.fail(GrammarError::DuplicateSymbol(SmolStr::new(name)));
            }
            return sym;
        }
        self.check_name(name);
        self.push_rule(SmolStr::new(name))
    }

    pub fn production(&mut self, lhs: Sym, rhs: &[Sym]) -> ProductionSpec<'_> {
        if lhs.terminal {
            let name = self.sym_name(lhs);
            self.fail(GrammarError::TerminalOnLeft(name));
        }
        self.productions.push(ProductionDef {
            lhs,
            rhs: rhs.to_vec(),
            precedence: None,
        });
        let last = self.productions.len() - 1;
        ProductionSpec {
            def: &mut self.productions[last],
        }
    }

    /// Zero or more `element`s, as a hidden left-recursive rule.
    pub fn repeat(&mut self, element: Sym) -> Sym {
        self.aux_rule(AuxKind::Repeat, element, |g, aux| {
            g.production(aux, &[aux, element]);
            g.production(aux, &[]);
        })
    }

    /// One or more `element`s.
    pub fn repeat1(&mut self, element: Sym) -> Sym {
        self.aux_rule(AuxKind::Repeat1, element, |g, aux| {
            g.production(aux, &[aux, element]);
            g.production(aux, &[element]);
        })
    }

    /// `element` or nothing.
    pub fn optional(&mut self, element: Sym) -> Sym {
        self.aux_rule(AuxKind::Optional, element, |g, aux| {
            g.production(aux, &[element]);
            g.production(aux, &[]);
        })
    }

    pub fn start(&mut self, rule: Sym) {
        if rule.terminal {
            let name = self.sym_name(rule);
            self.fail(GrammarError::TerminalOnLeft(name));
        }
        self.start = Some(rule);
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        Grammar::from_builder(self)
    }

    pub(crate) fn sym_name(&self, sym: Sym) -> SmolStr {
        let index = sym.index as usize;
        if sym.terminal {
            self.terminals[index].name.clone()
        } else {
            self.rules[index].clone()
        }
    }

    fn aux_rule(
        &mut self,
        kind: AuxKind,
        element: Sym,
        define: impl FnOnce(&mut Self, Sym),
    ) -> Sym {
        if let Some(existing) = self.aux.get(&(kind, element)) {
            return *existing;
        }
        let base = if element.terminal
            && matches!(self.terminals[element.index as usize].source, TokenSource::Literal(_))
        {
            SmolStr::new_static("token")
        } else {
            let name = self.sym_name(element);
            SmolStr::new(name.trim_start_matches('_'))
        };
        let suffix = match kind {
            AuxKind::Repeat => "repeat",
            AuxKind::Repeat1 => "repeat1",
            AuxKind::Optional => "opt",
        };
        let name = format_smolstr!("_{}_{}{}", base, suffix, self.aux.len());
        let aux = self.push_rule(name);
        self.aux.insert((kind, element), aux);
        define(self, aux);
        aux
    }

    fn push_terminal(&mut self, def: TerminalDef) -> Sym {
        let sym = Sym {
            index: self.terminals.len() as u16,
            terminal: true,
        };
        if self.terminals.len() >= u16::MAX as usize / 2 {
            self.fail(GrammarError::Limit("tokens"));
        }
        self.terminals.push(def);
        sym
    }

    fn push_rule(&mut self, name: SmolStr) -> Sym {
        let sym = Sym {
            index: self.rules.len() as u16,
            terminal: false,
        };
        if self.rules.len() >= u16::MAX as usize / 2 {
            self.fail(GrammarError::Limit("rules"));
        }
        self.names.insert(name.clone(), sym);
        self.rules.push(name);
        sym
    }

    fn declare(&mut self, name: &str, sym: Sym) {
        if self.names.insert(SmolStr::new(name), sym).is_some() {
            self.fail(GrammarError::DuplicateSymbol(SmolStr::new(name)));
        }
    }

    fn check_name(&mut self, name: &str) {
        if !is_valid_name(name) {
            self.fail(GrammarError::InvalidName(SmolStr::new(name)));
        }
    }

    fn terminal_mut(&mut self, sym: Sym) -> Option<&mut TerminalDef> {
        if sym.terminal {
            self.terminals.get_mut(sym.index as usize)
        } else {
            None
        }
    }

    /// Keep the first error; `build` reports it.
    fn fail(&mut self, error: GrammarError) {
        self.error.get_or_insert(error);
    }
}

/// Symbol names follow identifier rules, with a leading `_` allowed.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

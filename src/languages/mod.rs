//! Built-in grammars.
//!
//! Each grammar is built on first use and shared for the rest of the
//! process. [`heptagon()`] is the entry point for the Heptagon language.

mod arithmetic;
mod heptagon;

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::grammar::{GrammarError, GrammarHandle};

/// Identifiers accepted by [`crate::load_grammar`] without registration
pub const BUILTIN_NAMES: [&str; 2] = ["arithmetic", "heptagon"];

type Built = Result<GrammarHandle, GrammarError>;

static ARITHMETIC: Lazy<Built> = Lazy::new(|| arithmetic::grammar().map(Arc::new));
static HEPTAGON: Lazy<Built> = Lazy::new(|| heptagon::grammar().map(Arc::new));

/// Arithmetic expressions over integers with `+ - * /` and parentheses.
pub fn arithmetic() -> Built {
    ARITHMETIC.clone()
}

/// The Heptagon synchronous dataflow language.
pub fn heptagon() -> Built {
    HEPTAGON.clone()
}

pub(crate) fn builtin(name: &str) -> Option<Built> {
    match name {
        "arithmetic" => Some(arithmetic()),
        "heptagon" => Some(heptagon()),
        _ => None,
    }
}

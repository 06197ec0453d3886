//! Process-wide grammar lookup by name.
//!
//! Built-in grammars are constructed on first use; grammars registered at
//! runtime shadow built-ins of the same name.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::{Grammar, GrammarHandle};
use crate::errors::{Error, Result};
use crate::languages;

static REGISTRY: Lazy<RwLock<FxHashMap<SmolStr, GrammarHandle>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Look up a grammar by identifier.
///
/// # Errors
///
/// [`Error::GrammarNotFound`] for unknown identifiers, or
/// [`Error::Grammar`] if a built-in grammar fails to build.
pub fn load_grammar(name: &str) -> Result<GrammarHandle> {
    if let Some(handle) = REGISTRY.read().get(name) {
        return Ok(handle.clone());
    }
    match languages::builtin(name) {
        Some(built) => Ok(built?),
        None => Err(Error::GrammarNotFound(SmolStr::new(name))),
    }
}

/// Make `grammar` loadable under its own name, replacing any earlier entry.
pub fn register_grammar(grammar: Grammar) -> GrammarHandle {
    let handle = Arc::new(grammar);
    let name = SmolStr::new(handle.name());
    debug!(grammar = %name, "registered grammar");
    REGISTRY.write().insert(name, handle.clone());
    handle
}

/// Names of every loadable grammar, sorted.
pub fn registered_grammars() -> Vec<SmolStr> {
    let mut names: Vec<SmolStr> = REGISTRY.read().keys().cloned().collect();
    for builtin in languages::BUILTIN_NAMES {
        if !names.iter().any(|n| n == builtin) {
            names.push(SmolStr::new_static(builtin));
        }
    }
    names.sort();
    names
}

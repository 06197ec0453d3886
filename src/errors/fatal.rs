//! Errors that fail a whole call.

use smol_str::SmolStr;
use thiserror::Error;

use crate::grammar::GrammarError;

/// Errors surfaced to callers of the public interface.
#[derive(Debug, Error)]
pub enum Error {
    /// No grammar is registered under the requested identifier.
    #[error("grammar not found: {0}")]
    GrammarNotFound(SmolStr),

    /// The edit descriptor does not fit the old tree or the new source.
    /// Callers fall back to a full parse.
    #[error("invalid edit: {message}")]
    InvalidEdit { message: String },

    /// A grammar definition could not be turned into parse tables.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl Error {
    /// Create an invalid edit error.
    pub fn invalid_edit(message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

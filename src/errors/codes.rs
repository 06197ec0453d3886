//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (unrecognized input)
//! - E02xx: Syntactic errors (no grammar action)
//! - E03xx: Resource errors (parse budget)

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Input that no token of the grammar matches
    E0101,

    // =========================================================================
    // E02xx: Syntactic errors
    // =========================================================================
    /// Token that is not valid in the current parse state
    E0201,
    /// Input ended before the grammar's start rule was complete
    E0202,

    // =========================================================================
    // E03xx: Resource errors
    // =========================================================================
    /// The operation budget ran out; the rest of the input is unparsed
    E0301,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0301 => "E0301",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 => "lexical error",
            Self::E0201 | Self::E0202 => "syntax error",
            Self::E0301 => "resource error",
        }
    }

    /// Default message used when none is supplied
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "unrecognized input",
            Self::E0201 => "unexpected token",
            Self::E0202 => "unexpected end of input",
            Self::E0301 => "parse aborted: operation budget exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

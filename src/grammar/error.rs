use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while building a grammar and its tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar `{0}` has no start rule")]
    MissingStart(SmolStr),

    #[error("duplicate symbol name `{0}`")]
    DuplicateSymbol(SmolStr),

    #[error("invalid symbol name `{0}`")]
    InvalidName(SmolStr),

    #[error("literal tokens cannot be empty")]
    EmptyLiteral,

    #[error("rule `{0}` has no productions")]
    EmptyRule(SmolStr),

    #[error("token `{0}` cannot appear on the left-hand side of a production")]
    TerminalOnLeft(SmolStr),

    #[error("`{0}` must be a token")]
    NotATerminal(SmolStr),

    #[error("invalid pattern for `{name}`: {message}")]
    InvalidPattern { name: SmolStr, message: String },

    #[error("token `{0}` matches the empty string")]
    EmptyToken(SmolStr),

    #[error("lexer construction failed: {0}")]
    Lexer(String),

    #[error("grammar exceeds the maximum number of {0}")]
    Limit(&'static str),
}

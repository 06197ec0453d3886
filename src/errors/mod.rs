//! Error handling module
//!
//! Two kinds of failure exist in the parsing core:
//! - [`Error`]: fatal to a single call (unknown grammar, invalid edit,
//!   malformed grammar definition)
//! - [`SyntaxError`]: diagnostics read off the ERROR nodes of a tree.
//!   Malformed input never fails a parse; it produces error nodes.

mod codes;
mod error;
mod fatal;

pub use codes::ErrorCode;
pub use error::{SyntaxError, SyntaxErrorBuilder};
pub use fatal::{Error, Result};

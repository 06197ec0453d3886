//! Foundation types for the parsing core.
//!
//! This module provides the position primitives used throughout the crate:
//! - [`TextRange`], [`TextSize`] - byte offsets into the source
//! - [`Point`] - zero-based row/column positions
//! - [`LineIndex`] - byte offset to [`Point`] conversion
//!
//! This module has NO dependencies on other modules of the crate.

mod position;

pub use position::{LineIndex, Point};

pub use text_size::{TextLen, TextRange, TextSize};

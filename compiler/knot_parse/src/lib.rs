//! Reader for Knot source text.
//!
//! [`parse`] turns text into one root list of literals and nested lists.
//! Parenthesized and indentation-based blocks produce the same shape, so
//! the loader never sees which syntax was used.

mod cursor;
mod error;
mod reader;

pub use error::{ParseError, ParseErrorKind};
pub use reader::parse;

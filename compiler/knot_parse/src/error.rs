//! Reader errors.

use std::fmt;

/// What went wrong while reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnterminatedString,
    /// `(` with no matching `)`. Position is the opening paren.
    UnterminatedList,
    UnexpectedClose,
    InvalidEscape { escape: String },
    IntegerOverflow { literal: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            ParseErrorKind::UnterminatedList => write!(f, "unterminated list: missing `)`"),
            ParseErrorKind::UnexpectedClose => write!(f, "unexpected `)`"),
            ParseErrorKind::InvalidEscape { escape } => {
                write!(f, "invalid escape sequence `\\{escape}`")
            }
            ParseErrorKind::IntegerOverflow { literal } => {
                write!(f, "integer literal out of range: {literal}")
            }
        }
    }
}

/// Reader error with a 1-based source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.kind)
    }
}

impl std::error::Error for ParseError {}

//! Source text to nested lists.
//!
//! Two surface syntaxes produce the same shape:
//!
//! ```text
//! def main () () (2 3 add p)
//!
//! def main () ():
//!     2 3 add p
//! ```
//!
//! A line-level `name:` opens a list after the symbol `name`; a bare `:`
//! opens a list with no symbol in front. The list receives the rest of the
//! line plus every following line indented deeper than the opening line.

use crate::cursor::{Cursor, Pos};
use crate::{ParseError, ParseErrorKind};
use knot_ir::stack::ensure_sufficient_stack;
use knot_ir::{Pool, Value};

/// A list under construction at line level.
struct OpenBlock {
    /// Indentation of the line that opened it; `None` for the root.
    indent: Option<usize>,
    items: Vec<Value>,
}

struct Reader<'a, 'p> {
    cursor: Cursor<'a>,
    pool: &'p mut Pool,
    blocks: Vec<OpenBlock>,
}

/// Read `source` into a root list.
///
/// The result is always a list (nil for empty input).
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(pool: &mut Pool, source: &str) -> Result<Value, ParseError> {
    let mut reader = Reader {
        cursor: Cursor::new(source),
        pool,
        blocks: vec![OpenBlock {
            indent: None,
            items: Vec::new(),
        }],
    };
    reader.read_lines()?;
    Ok(reader.finish())
}

impl<'a> Reader<'a, '_> {
    fn error(&self, kind: ParseErrorKind, pos: Pos) -> ParseError {
        ParseError {
            kind,
            line: pos.line,
            column: pos.column,
        }
    }

    fn push(&mut self, value: Value) {
        if let Some(block) = self.blocks.last_mut() {
            block.items.push(value);
        }
    }

    /// Close the innermost block, appending its list to the parent.
    fn close_block(&mut self) {
        if let Some(block) = self.blocks.pop() {
            let list = self.pool.list_from(block.items);
            self.push(list);
        }
    }

    fn finish(mut self) -> Value {
        while self.blocks.len() > 1 {
            self.close_block();
        }
        let root = self.blocks.pop().map(|b| b.items).unwrap_or_default();
        self.pool.list_from(root)
    }

    fn read_lines(&mut self) -> Result<(), ParseError> {
        loop {
            let indent = self.cursor.skip_indent();
            match self.cursor.peek() {
                None => return Ok(()),
                Some(b'\n') => {
                    self.cursor.bump();
                    continue;
                }
                Some(b';') => {
                    self.cursor.skip_comment();
                    continue;
                }
                Some(_) => {}
            }

            while self
                .blocks
                .last()
                .is_some_and(|b| b.indent.is_some_and(|i| i >= indent))
            {
                self.close_block();
            }

            self.read_line(indent)?;
        }
    }

    fn read_line(&mut self, indent: usize) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_inline_space();
            match self.cursor.peek() {
                None => return Ok(()),
                Some(b'\n') => {
                    self.cursor.bump();
                    return Ok(());
                }
                Some(b';') => self.cursor.skip_comment(),
                _ => {
                    let start = self.cursor.position();
                    if let Some(label) = self.read_opener() {
                        if let Some(name) = label {
                            let sym = self.pool.intern(name);
                            self.push(Value::Sym(sym));
                        }
                        self.blocks.push(OpenBlock {
                            indent: Some(indent),
                            items: Vec::new(),
                        });
                    } else {
                        let value = self.read_item(start)?;
                        self.push(value);
                    }
                }
            }
        }
    }

    /// Consume a `name:` or `:` token if one is next.
    ///
    /// Returns `Some(Some(name))`, `Some(None)` for a bare colon, or `None`
    /// (cursor untouched) for anything else.
    fn read_opener(&mut self) -> Option<Option<&'a str>> {
        let rest = self.cursor.peek_token();
        if rest == ":" {
            self.cursor.take_token();
            Some(None)
        } else if rest.len() > 1 && rest.ends_with(':') {
            let token = self.cursor.take_token();
            Some(Some(&token[..token.len() - 1]))
        } else {
            None
        }
    }

    /// Read one element: a parenthesized list, a string or an atom.
    fn read_item(&mut self, start: Pos) -> Result<Value, ParseError> {
        match self.cursor.peek() {
            Some(b'(') => {
                self.cursor.bump();
                ensure_sufficient_stack(|| self.read_paren_list(start))
            }
            Some(b')') => Err(self.error(ParseErrorKind::UnexpectedClose, start)),
            Some(b'"') => {
                self.cursor.bump();
                self.read_string(start)
            }
            _ => {
                let token = self.cursor.take_token();
                self.atom(token, start)
            }
        }
    }

    fn read_paren_list(&mut self, open: Pos) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        loop {
            self.cursor.skip_trivia();
            let start = self.cursor.position();
            match self.cursor.peek() {
                None => return Err(self.error(ParseErrorKind::UnterminatedList, open)),
                Some(b')') => {
                    self.cursor.bump();
                    return Ok(self.pool.list_from(items));
                }
                Some(_) => items.push(self.read_item(start)?),
            }
        }
    }

    fn read_string(&mut self, open: Pos) -> Result<Value, ParseError> {
        let mut bytes = Vec::new();
        loop {
            let Some(end) = self.cursor.find_quote_or_escape() else {
                return Err(self.error(ParseErrorKind::UnterminatedString, open));
            };
            bytes.extend_from_slice(self.cursor.take_until(end));
            let escape_pos = self.cursor.position();
            match self.cursor.bump() {
                Some(b'"') => break,
                Some(_) => bytes.push(self.read_escape(escape_pos)?),
                None => return Err(self.error(ParseErrorKind::UnterminatedString, open)),
            }
        }
        Ok(self.pool.alloc_str(bytes))
    }

    fn read_escape(&mut self, pos: Pos) -> Result<u8, ParseError> {
        let invalid = |escape: String| ParseErrorKind::InvalidEscape { escape };
        match self.cursor.bump() {
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'0') => Ok(0),
            Some(b'\\') => Ok(b'\\'),
            Some(b'"') => Ok(b'"'),
            Some(b'x') => {
                let hi = self.cursor.bump();
                let lo = self.cursor.bump();
                let digits: Vec<u8> = [hi, lo].into_iter().flatten().collect();
                let text = String::from_utf8_lossy(&digits).into_owned();
                u8::from_str_radix(&text, 16)
                    .ok()
                    .filter(|_| digits.len() == 2)
                    .ok_or_else(|| self.error(invalid(format!("x{text}")), pos))
            }
            Some(other) => Err(self.error(invalid(char::from(other).to_string()), pos)),
            None => Err(self.error(ParseErrorKind::UnterminatedString, pos)),
        }
    }

    fn atom(&mut self, token: &str, start: Pos) -> Result<Value, ParseError> {
        let digits = token.strip_prefix('-').unwrap_or(token);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return token.parse::<i64>().map(Value::Int).map_err(|_| {
                self.error(
                    ParseErrorKind::IntegerOverflow {
                        literal: token.to_owned(),
                    },
                    start,
                )
            });
        }
        Ok(Value::Sym(self.pool.intern(token)))
    }
}

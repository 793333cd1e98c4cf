//! Byte cursor with line/column tracking.

use memchr::{memchr, memchr2, memchr_iter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pos {
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Cursor {
            src,
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn position(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.pos - self.line_start + 1,
        }
    }

    /// Advance one byte, tracking newlines.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(b)
    }

    /// Advance to `end`, counting any newlines in between.
    fn advance_to(&mut self, end: usize) {
        let chunk = &self.bytes()[self.pos..end];
        for nl in memchr_iter(b'\n', chunk) {
            self.line += 1;
            self.line_start = self.pos + nl + 1;
        }
        self.pos = end;
    }

    /// Count and skip leading spaces and tabs.
    pub fn skip_indent(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip spaces and tabs but not newlines.
    pub fn skip_inline_space(&mut self) {
        self.skip_indent();
    }

    /// Skip everything up to (not including) the next newline.
    pub fn skip_comment(&mut self) {
        let rest = &self.bytes()[self.pos..];
        self.pos += memchr(b'\n', rest).unwrap_or(rest.len());
    }

    /// Skip whitespace (newlines included) and comments.
    pub fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b';') => self.skip_comment(),
                _ => return,
            }
        }
    }

    /// Take a bare token: bytes up to whitespace, a paren, a quote or `;`.
    pub fn take_token(&mut self) -> &'a str {
        let token = self.peek_token();
        self.pos += token.len();
        token
    }

    /// The token `take_token` would return, without consuming it.
    pub fn peek_token(&self) -> &'a str {
        let rest = &self.bytes()[self.pos..];
        let len = rest.iter().position(|&b| is_delimiter(b)).unwrap_or(rest.len());
        &self.src[self.pos..self.pos + len]
    }

    /// Index of the next `"` or `\` at or after the cursor.
    pub fn find_quote_or_escape(&self) -> Option<usize> {
        memchr2(b'"', b'\\', &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Consume up to `end`, returning the skipped bytes.
    pub fn take_until(&mut self, end: usize) -> &'a [u8] {
        let start = self.pos;
        self.advance_to(end);
        &self.bytes()[start..end]
    }
}

#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'"' | b';')
}

//! Lexer for sCalc infix expressions.
//!
//! The lexer is driven by the compiler: it is asked for the next element
//! from one of the two lexical tables depending on whether an operand is
//! expected, and it rescans literals on demand.

use scalc_foundation::numeric::parse_prefix;

use crate::token::{Element, OPERANDS, OPERATORS, lookup};

/// Cursor over the source bytes of one expression.
pub struct Lexer<'src> {
    /// Source text, cut at the first NUL.
    source: &'src [u8],
    /// Current byte offset in source.
    position: usize,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `source`, which ends at its first NUL if any.
    #[must_use]
    pub fn new(source: &'src [u8]) -> Self {
        let end = source.iter().position(|&b| b == 0).unwrap_or(source.len());
        Self {
            source: &source[..end],
            position: 0,
        }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the unconsumed source.
    #[must_use]
    pub fn rest(&self) -> &'src [u8] {
        &self.source[self.position..]
    }

    /// Returns true once only whitespace remains.
    #[must_use]
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.position >= self.source.len()
    }

    /// Consumes the next element from the operand or operator table.
    ///
    /// Returns the element and the offset it started at, or `None` at end of
    /// input or when nothing in the table matches.
    pub fn next_element(&mut self, operand_expected: bool) -> Option<(&'static Element, usize)> {
        self.skip_whitespace();
        let table = if operand_expected { OPERANDS } else { OPERATORS };
        let start = self.position;
        let element = lookup(table, self.rest())?;
        self.position += element.name.len();
        Some((element, start))
    }

    /// Rescans a numeric literal that starts at `start`, leaving the cursor
    /// after it.
    ///
    /// Returns `None` if no number begins there.
    pub fn scan_number(&mut self, start: usize) -> Option<f64> {
        let (value, len) = parse_prefix(&self.source[start..])?;
        self.position = start + len;
        Some(value)
    }

    /// Consumes string literal content up to the closing `quote` (or end of
    /// input) and returns it; the closing quote itself is skipped.
    pub fn scan_string(&mut self, quote: u8) -> &'src [u8] {
        let rest = self.rest();
        let len = rest.iter().position(|&b| b == quote).unwrap_or(rest.len());
        self.position += len;
        if self.position < self.source.len() {
            self.position += 1;
        }
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        while self
            .source
            .get(self.position)
            .is_some_and(u8::is_ascii_whitespace)
        {
            self.position += 1;
        }
    }
}

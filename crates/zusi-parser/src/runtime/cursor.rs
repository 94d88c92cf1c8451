//! Byte-cursor over the input buffer and the tag-level scanning primitives
//! every generated `parse_element_*` function is built out of.
//!
//! There is deliberately no line/column tracking: every error carries a byte
//! offset, and turning that into a human-readable
//! location is left to the caller, who has the whole buffer available.

use super::tables;
use crate::error::{ParseError, ParseErrorReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTail {
    /// `/>` — no children, no closing tag to match.
    SelfClosing,
    /// `>` — contents follow, terminated by a matching `</name>`.
    Open,
}

pub struct Cursor<'input> {
    input: &'input [u8],
    pos: usize,
}

impl<'input> Cursor<'input> {
    pub fn new(input: &'input [u8]) -> Self { Self { input, pos: 0 } }

    #[inline]
    pub fn offset(&self) -> usize { self.pos }

    #[inline]
    pub fn input(&self) -> &'input [u8] { self.input }

    #[inline]
    pub fn at_eof(&self) -> bool { self.pos >= self.input.len() }

    #[inline]
    pub fn peek(&self) -> Option<u8> { self.input.get(self.pos).copied() }

    #[inline]
    fn peek_at(&self, delta: usize) -> Option<u8> { self.input.get(self.pos + delta).copied() }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) { self.pos += n; }

    #[inline]
    pub(crate) fn seek(&mut self, pos: usize) { self.pos = pos; }

    #[inline]
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(tables::is_whitespace) {
            self.pos += 1;
        }
    }

    #[inline]
    pub fn at_attribute_name(&self) -> bool { self.peek().is_some_and(tables::is_attribute_name) }

    pub fn read_attribute_name(&mut self) -> Result<&'input [u8], ParseErrorReport> {
        let start = self.pos;
        while self.peek().is_some_and(tables::is_attribute_name) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::ExpectedElementName { offset: self.pos }.into());
        }
        Ok(&self.input[start..self.pos])
    }

    /// Consumes `byte` if it's next, otherwise fails with the error variant
    /// that matches it (`=`, a quote, or `>`).
    pub fn expect_byte(&mut self, byte: u8) -> Result<(), ParseErrorReport> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            let offset = self.pos;
            Err(match byte {
                b'=' => ParseError::ExpectedEquals { offset },
                b'\'' | b'"' => ParseError::ExpectedQuote { offset },
                b'>' => ParseError::ExpectedTagEnd { offset },
                _ => ParseError::ExpectedTagEnd { offset },
            }
            .into())
        }
    }

    pub fn read_quote_char(&mut self) -> Result<u8, ParseErrorReport> {
        match self.peek() {
            Some(q @ (b'\'' | b'"')) => {
                self.pos += 1;
                Ok(q)
            }
            _ => Err(ParseError::ExpectedQuote { offset: self.pos }.into()),
        }
    }

    /// Skips an attribute value without decoding it (used for attributes the
    /// generated dispatch doesn't recognize). Character references are not
    /// expanded since the content is discarded; only the quote/NUL class
    /// matters for finding where the value ends.
    pub fn skip_attribute_value(&mut self, quote: u8) {
        while self.peek().is_some_and(|b| tables::is_attribute_data(b, quote)) {
            self.pos += 1;
        }
    }

    /// Like [`skip_attribute_value`], but also stops at `&`, so the caller
    /// can cheaply tell whether the value needs entity expansion at all.
    pub(crate) fn skip_attribute_value_pure(&mut self, quote: u8) {
        while self.peek().is_some_and(|b| tables::is_attribute_data_pure(b, quote)) {
            self.pos += 1;
        }
    }

    pub fn read_element_tail(&mut self) -> Result<ElementTail, ParseErrorReport> {
        match self.peek() {
            Some(b'>') => {
                self.pos += 1;
                Ok(ElementTail::Open)
            }
            Some(b'/') => {
                self.pos += 1;
                self.expect_byte(b'>')?;
                Ok(ElementTail::SelfClosing)
            }
            _ => Err(ParseError::ExpectedTagEnd { offset: self.pos }.into()),
        }
    }

    #[inline]
    pub fn at_close_tag(&self) -> bool { self.peek() == Some(b'<') && self.peek_at(1) == Some(b'/') }

    /// Consumes `</name>`. The closing name is not checked against the
    /// opening one, matching the permissive, non-validating read the rest of
    /// this scanner is built around.
    pub fn read_close_tag(&mut self) -> Result<(), ParseErrorReport> {
        self.advance(2); // "</"
        while self.peek().is_some_and(tables::is_node_name) {
            self.pos += 1;
        }
        self.skip_whitespace();
        self.expect_byte(b'>')
    }

    /// Consumes `<` and the element name that follows, leaving the cursor
    /// just past the name (any whitespace before the first attribute or the
    /// tag's `>`/`/>` is left for the callee to skip).
    pub fn read_child_name(&mut self) -> Result<&'input [u8], ParseErrorReport> {
        self.expect_lt()?;
        let start = self.pos;
        while self.peek().is_some_and(tables::is_node_name) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::ExpectedElementName { offset: self.pos }.into());
        }
        Ok(&self.input[start..self.pos])
    }

    fn expect_lt(&mut self) -> Result<(), ParseErrorReport> {
        if self.peek() == Some(b'<') {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::ExpectedElementName { offset: self.pos }.into())
        }
    }

    /// Skips a whole element subtree whose name the caller didn't recognize:
    /// its attributes, then either `/>` or its full contents up to and
    /// including the matching close tag. Recurses into unrecognized children
    /// of its own.
    pub fn skip_element_subtree(&mut self) -> Result<(), ParseErrorReport> {
        self.skip_whitespace();
        while self.at_attribute_name() {
            self.read_attribute_name()?;
            self.expect_byte(b'=')?;
            let quote = self.read_quote_char()?;
            self.skip_attribute_value(quote);
            self.expect_byte(quote)?;
            self.skip_whitespace();
        }

        match self.read_element_tail()? {
            ElementTail::SelfClosing => Ok(()),
            ElementTail::Open => self.skip_element_contents(),
        }
    }

    fn skip_element_contents(&mut self) -> Result<(), ParseErrorReport> {
        loop {
            self.skip_whitespace();
            if self.at_close_tag() {
                return self.read_close_tag();
            }
            if self.at_eof() {
                return Err(ParseError::UnexpectedEndOfData { offset: self.pos }.into());
            }
            if self.peek() == Some(b'<') {
                self.read_child_name()?;
                self.skip_whitespace();
                self.skip_element_subtree()?;
            } else {
                while self.peek().is_some_and(tables::is_text) {
                    self.pos += 1;
                }
            }
        }
    }

    /// Used by the `Vec2`/`Vec3`/`Quaternion` shape parsers, which have no
    /// children of their own: discards whatever's between `>` and the
    /// matching close tag without interpreting it as child elements.
    pub fn skip_element_contents_no_children(&mut self) -> Result<(), ParseErrorReport> {
        self.skip_element_contents()
    }
}

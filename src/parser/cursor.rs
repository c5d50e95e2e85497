//! Copyable position cursor over a [`TokenSource`]
//!
//! Grammar rules never share a mutable position. Each fallible rule copies
//! the caller's [`Cursor`], works on the copy, and assigns it back only once
//! the rule has matched:
//!
//! ```text
//! let mut pos = *cursor;
//! ... advance pos, return Ok(None) on mismatch ...
//! *cursor = pos;
//! ```
//!
//! A rule that does not match therefore leaves its caller's cursor exactly
//! where it was.

use super::token::{Token, TokenIndex, TokenKind, TokenSource};
use std::fmt;

/// Which tokens a cursor stops on while advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Every token is visible.
    All,
    /// Comments are skipped; whitespace and newlines are visible.
    HideComments,
    /// Comments, whitespace and newlines are skipped.
    #[default]
    HideTrivia,
}

impl Filter {
    pub fn allows(self, kind: TokenKind) -> bool {
        match self {
            Filter::All => true,
            Filter::HideComments => !kind.is_comment(),
            Filter::HideTrivia => !kind.is_trivia(),
        }
    }
}

/// A position inside a [`TokenSource`].
#[derive(Clone, Copy)]
pub struct Cursor<'src> {
    source: &'src TokenSource,
    index: TokenIndex,
}

impl<'src> Cursor<'src> {
    /// Cursor at the first token of `source`.
    pub fn new(source: &'src TokenSource) -> Self {
        Self { source, index: 0 }
    }

    pub fn at(source: &'src TokenSource, index: TokenIndex) -> Self {
        Self {
            source,
            index: index.min(source.last_index()),
        }
    }

    pub fn index(&self) -> TokenIndex {
        self.index
    }

    pub fn source(&self) -> &'src TokenSource {
        self.source
    }

    pub fn token(&self) -> &'src Token {
        self.source.get(self.index)
    }

    pub fn kind(&self) -> TokenKind {
        self.token().kind
    }

    pub fn text(&self) -> &'src str {
        &self.token().text
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn at_end(&self) -> bool {
        self.is(TokenKind::EndOfStream)
    }

    /// Advance one visible token, hiding trivia.
    pub fn advance(&mut self) {
        self.advance_by(1, Filter::HideTrivia);
    }

    /// Advance `count` tokens that `filter` allows.
    ///
    /// Stops on the end-of-stream sentinel; advancing from it is a no-op.
    pub fn advance_by(&mut self, count: usize, filter: Filter) {
        let last = self.source.last_index();
        for _ in 0..count {
            loop {
                if self.index >= last {
                    return;
                }
                self.index += 1;
                if filter.allows(self.kind()) {
                    break;
                }
            }
        }
    }

    /// Advance, then return the token now under the cursor.
    pub fn next_token(&mut self) -> &'src Token {
        self.advance();
        self.token()
    }

    /// The next visible token, without moving.
    pub fn peek(&self) -> &'src Token {
        let mut ahead = *self;
        ahead.advance();
        ahead.token()
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.source, other.source) && self.index == other.index
    }
}

impl Eq for Cursor<'_> {}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("token", self.token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_skips_trivia() {
        let source = TokenSource::from_text("a /* c */ \n b").unwrap();
        let mut cursor = Cursor::new(&source);
        assert_eq!(cursor.text(), "a");
        cursor.advance();
        assert_eq!(cursor.text(), "b");
    }

    #[test]
    fn test_comment_filter_keeps_whitespace() {
        let source = TokenSource::from_text("a /* c */b").unwrap();
        let mut cursor = Cursor::new(&source);
        cursor.advance_by(1, Filter::HideComments);
        assert_eq!(cursor.kind(), TokenKind::Whitespace);
        cursor.advance_by(1, Filter::HideComments);
        assert_eq!(cursor.text(), "b");
    }

    #[test]
    fn test_advance_stops_at_end_of_stream() {
        let source = TokenSource::from_text("a b").unwrap();
        let mut cursor = Cursor::new(&source);
        cursor.advance_by(10, Filter::HideTrivia);
        assert!(cursor.at_end());
        let before = cursor;
        cursor.advance();
        assert_eq!(cursor, before);
    }

    #[test]
    fn test_peek_does_not_move() {
        let source = TokenSource::from_text("public :").unwrap();
        let cursor = Cursor::new(&source);
        assert_eq!(cursor.peek().kind, TokenKind::Colon);
        assert_eq!(cursor.kind(), TokenKind::Public);
    }
}

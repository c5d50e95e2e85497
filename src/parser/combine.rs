//! Token-run accumulation with nesting awareness
//!
//! Initializers, default arguments and enumerator values are kept as opaque
//! text. To find where such a run ends, [`combine_while_scope_aware`] tracks
//! four bracket depths (`{}`, `[]`, `()`, `<>`) and only consults the stop
//! predicate when all of them are zero, so the `,` inside `f(a, b)` does not
//! end the capture of `x = f(a, b), y`.
//!
//! [`capture_scope`] collects the exact contents of one bracketed span and is
//! used for bodies, array dimensions and argument lists of member
//! initializers.

use super::cursor::{Cursor, Filter};
use super::parse::{ParseError, ParseErrorKind, ParseResult};
use super::token::{Token, TokenIndex, TokenKind};

/// What a scope-aware capture does when a closing bracket has no opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeMode {
    /// End the capture before the unmatched closer, leaving it for the caller.
    #[default]
    Loose,
    /// Report [`ParseErrorKind::UnbalancedScope`].
    Strict,
}

/// Signed depth counters for the four bracket kinds.
#[derive(Debug, Default)]
struct ScopeDepth {
    brace: i32,
    bracket: i32,
    paren: i32,
    angle: i32,
}

impl ScopeDepth {
    fn at_top_level(&self) -> bool {
        self.brace == 0 && self.bracket == 0 && self.paren == 0 && self.angle == 0
    }

    /// Update the counters for `kind`. Returns false when a counter went
    /// negative.
    fn track(&mut self, kind: TokenKind) -> bool {
        let counter = match kind {
            TokenKind::LBrace => {
                self.brace += 1;
                return true;
            }
            TokenKind::LBracket => {
                self.bracket += 1;
                return true;
            }
            TokenKind::LParen => {
                self.paren += 1;
                return true;
            }
            TokenKind::LAngle => {
                self.angle += 1;
                return true;
            }
            TokenKind::RBrace => &mut self.brace,
            TokenKind::RBracket => &mut self.bracket,
            TokenKind::RParen => &mut self.paren,
            TokenKind::RAngle => &mut self.angle,
            _ => return true,
        };
        *counter -= 1;
        *counter >= 0
    }
}

/// Accumulate token text while `accept` holds, without nesting awareness.
///
/// The cursor ends on the first rejected token (or end of stream).
pub fn combine_while<'src, F>(cursor: &mut Cursor<'src>, filter: Filter, mut accept: F) -> String
where
    F: FnMut(&Token) -> bool,
{
    let mut pos = *cursor;
    let mut text = String::new();
    while !pos.at_end() && accept(pos.token()) {
        text.push_str(pos.text());
        pos.advance_by(1, filter);
    }
    *cursor = pos;
    text
}

/// Accumulate token text while `accept` holds at bracket depth zero.
///
/// Inside nested brackets every token is taken. A closing bracket with no
/// opener ends the capture in [`ScopeMode::Loose`] and is an error in
/// [`ScopeMode::Strict`]. The cursor ends on the stop token.
pub fn combine_while_scope_aware<'src, F>(
    cursor: &mut Cursor<'src>,
    filter: Filter,
    mode: ScopeMode,
    mut accept: F,
) -> ParseResult<String>
where
    F: FnMut(&Token) -> bool,
{
    let mut pos = *cursor;
    let mut depth = ScopeDepth::default();
    let mut text = String::new();

    while !pos.at_end() {
        let token = pos.token();
        if depth.at_top_level() && !accept(token) {
            break;
        }
        if !depth.track(token.kind) {
            match mode {
                ScopeMode::Loose => break,
                ScopeMode::Strict => {
                    return Err(ParseError::at(
                        ParseErrorKind::UnbalancedScope { close: token.kind },
                        &pos,
                    ));
                }
            }
        }
        text.push_str(&token.text);
        pos.advance_by(1, filter);
    }

    *cursor = pos;
    Ok(text)
}

/// Capture the tokens between `open` and its matching `close`.
///
/// Returns `Ok(None)` without moving when the cursor is not on `open`.
/// Nested `open`/`close` pairs are part of the span; the outer pair is not.
/// On success the cursor is left on the first visible token after `close`.
/// Hitting end of stream first is [`ParseErrorKind::UnterminatedScope`],
/// reported at the line of the innermost unclosed opener.
pub fn capture_scope<'src>(
    cursor: &mut Cursor<'src>,
    open: TokenKind,
    close: TokenKind,
    filter: Filter,
) -> ParseResult<Option<Vec<TokenIndex>>> {
    if !cursor.is(open) {
        return Ok(None);
    }

    let mut pos = *cursor;
    let mut openers = vec![pos.line()];
    let mut span = Vec::new();
    pos.advance_by(1, filter);

    loop {
        let kind = pos.kind();
        if kind == TokenKind::EndOfStream {
            let line = openers.last().copied().unwrap_or_else(|| pos.line());
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedScope { open },
                line,
            ));
        }
        if kind == close {
            openers.pop();
            if openers.is_empty() {
                break;
            }
        } else if kind == open {
            openers.push(pos.line());
        }
        span.push(pos.index());
        pos.advance_by(1, filter);
    }

    pos.advance();
    *cursor = pos;
    Ok(Some(span))
}

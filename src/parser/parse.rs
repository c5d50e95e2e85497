//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, parser options, diagnostics and the top-level
//! dispatch loop.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, root dispatch, preprocessor and unknown-token handling
//! - `types`: base types, pointer/reference chains, array dimensions
//! - `declarations`: variables, functions, arguments and declarators
//! - `classes`: classes, enums, namespaces, constructors and destructors
//!
//! # Backtracking
//!
//! Rules never mutate the caller's [`Cursor`] unless they match. A rule that
//! does not apply returns `Ok(false)` / `Ok(None)` and the caller tries the
//! next alternative. Structural violations that make the rest of the unit
//! meaningless return `Err(ParseError)`, which unwinds the whole unit.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::combine::{capture_scope, ScopeMode};
use crate::parser::cursor::{Cursor, Filter};
use crate::parser::token::{TokenIndex, TokenKind, TokenSource};
use std::fmt;
use thiserror::Error;

/// Structural violations that abort the current translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected class name after 'class'")]
    ExpectedClassName,
    #[error("expected '{{' or ':' after class name, found {found}")]
    ExpectedClassBody { found: String },
    #[error("expected enum name after 'enum', found {found}")]
    ExpectedEnumName { found: String },
    #[error("expected '{{' to open the enum body, found {found}")]
    ExpectedEnumBody { found: String },
    #[error("expected ';' after {construct} closing brace")]
    MissingSemicolon { construct: &'static str },
    #[error("end of stream reached before the {open} opened here was closed")]
    UnterminatedScope { open: TokenKind },
    #[error("unbalanced {close} inside a scoped capture")]
    UnbalancedScope { close: TokenKind },
    #[error("cannot namespace the built-in type '{name}'")]
    NamespacedBuiltin { name: String },
    #[error("two built-in types in one declaration: '{first}' and '{second}'")]
    DuplicateBuiltinType { first: String, second: String },
    #[error("modifiers (const/volatile) are not allowed on a reference")]
    ReferenceModifier,
    #[error("variable '{name}' cannot have type void")]
    VoidVariable { name: String },
    #[error("expected '0', 'default' or 'delete' after '=' in a function declaration, found {found}")]
    InvalidPureVirtual { found: String },
    #[error("';' found while scanning an operator name")]
    OperatorScanOverrun,
    #[error("destructor with an initializer list is prohibited")]
    DestructorInitializer,
}

/// Fatal parse error: what went wrong and the source line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// Error reported at the token under `cursor`.
    pub fn at(kind: ParseErrorKind, cursor: &Cursor<'_>) -> Self {
        Self::new(kind, cursor.line())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Advisory notices; they never affect the resulting tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A token no rule could use; it was skipped.
    UnknownToken {
        line: usize,
        index: TokenIndex,
        text: String,
    },
    /// A preprocessor directive, captured and discarded.
    IgnoredDirective { line: usize, text: String },
    /// A `template <...>` prefix, captured and discarded.
    IgnoredTemplate { line: usize, text: String },
    /// A declaration dropped because its initializer ran into an unmatched
    /// closing bracket, e.g. a comparison read as a template argument list.
    TruncatedInitializer {
        line: usize,
        name: String,
        closer: String,
    },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::UnknownToken { line, .. }
            | Diagnostic::IgnoredDirective { line, .. }
            | Diagnostic::IgnoredTemplate { line, .. }
            | Diagnostic::TruncatedInitializer { line, .. } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownToken { line, index, text } => {
                write!(f, "line {line}: unknown token #{index}: {text:?}")
            }
            Diagnostic::IgnoredDirective { line, text } => {
                write!(f, "line {line}: ignoring preprocessor directive: \"{text}\"")
            }
            Diagnostic::IgnoredTemplate { line, text } => {
                write!(f, "line {line}: ignoring template scope: <{text}>")
            }
            Diagnostic::TruncatedInitializer { line, name, closer } => {
                write!(
                    f,
                    "line {line}: initializer of '{name}' stops at unmatched '{closer}', declaration skipped"
                )
            }
        }
    }
}

/// Knobs shared by every unit parsed with the same settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// How scope-aware captures treat a stray closing bracket.
    pub scope_mode: ScopeMode,
}

/// Recursive descent parser for one translation unit
pub struct Parser<'src> {
    pub(crate) source: &'src TokenSource,
    pub(crate) options: ParserOptions,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src TokenSource) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: &'src TokenSource, options: ParserOptions) -> Self {
        Self {
            source,
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole unit, appending top-level nodes to `root`.
    ///
    /// On error `root` may hold a partial tree; callers discard it.
    pub fn parse(&mut self, root: &mut AstNode) -> ParseResult<()> {
        let mut cursor = Cursor::new(self.source);
        while self.parse_root_item(&mut cursor, root)? {}
        Ok(())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Try every top-level rule in order. Returns false at end of stream.
    ///
    /// Every rule that reports success has consumed at least one token, so
    /// the loop in [`Parser::parse`] always terminates.
    pub(crate) fn parse_root_item(
        &mut self,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if cursor.at_end() {
            return Ok(false);
        }

        if self.parse_enum(cursor, parent)?
            || self.parse_class(cursor, parent)?
            || self.parse_namespace(cursor, parent)?
            || self.parse_linkage_block(cursor, parent)?
            || self.parse_template_prefix(cursor)?
            || self.parse_typedef(Visibility::Public, cursor, parent)?
            || self.parse_using(Visibility::Public, cursor, parent)?
            || self.parse_declaration(Visibility::Public, cursor, parent)?
            || self.parse_preprocessor(cursor)
            || self.parse_ignored(cursor)
        {
            return Ok(true);
        }

        self.parse_unknown(cursor);
        Ok(true)
    }

    // ===== Fallback rules =====

    /// `#` through end of line, recorded and dropped.
    pub(crate) fn parse_preprocessor(&mut self, cursor: &mut Cursor<'src>) -> bool {
        if !cursor.is(TokenKind::Hash) {
            return false;
        }

        let mut pos = *cursor;
        let line = pos.line();
        let mut tokens = Vec::new();
        while !pos.is(TokenKind::Newline) && !pos.at_end() {
            tokens.push(pos.index());
            pos.advance_by(1, Filter::All);
        }
        // land on the first visible token of the next line
        if !pos.at_end() {
            pos.advance();
        }

        let text = self.source.concat(&tokens, "");
        tracing::info!(target: "declscan::parser", line, "ignoring preprocessor directive: \"{}\"", text);
        self.diagnostics.push(Diagnostic::IgnoredDirective { line, text });

        *cursor = pos;
        true
    }

    /// Whitespace, comments and newlines left under the cursor.
    pub(crate) fn parse_ignored(&mut self, cursor: &mut Cursor<'src>) -> bool {
        if cursor.kind().is_trivia() {
            cursor.advance();
            true
        } else {
            false
        }
    }

    /// Record the token under the cursor as unknown and step over it.
    ///
    /// An unknown `{` is stepped over together with its balanced body, so the
    /// statements of a body no rule recognised (an out-of-line constructor,
    /// a `struct`) never surface as declarations of the enclosing scope.
    pub(crate) fn parse_unknown(&mut self, cursor: &mut Cursor<'src>) {
        let token = cursor.token();
        tracing::debug!(
            target: "declscan::parser",
            index = cursor.index(),
            line = token.line,
            "unknown token: {}",
            token
        );
        self.diagnostics.push(Diagnostic::UnknownToken {
            line: token.line,
            index: cursor.index(),
            text: token.text.clone(),
        });

        let mut pos = *cursor;
        match capture_scope(&mut pos, TokenKind::LBrace, TokenKind::RBrace, Filter::HideComments) {
            Ok(Some(_)) => {
                tracing::debug!(target: "declscan::parser", line = token.line, "skipping unrecognised block");
                *cursor = pos;
            }
            // an unclosed `{` is left for the enclosing scope to report
            _ => cursor.advance(),
        }
    }

    // ===== Helper methods =====

    /// Consume `kind` if it is under the cursor.
    pub(crate) fn match_token(&self, cursor: &mut Cursor<'src>, kind: TokenKind) -> bool {
        if cursor.is(kind) {
            cursor.advance();
            true
        } else {
            false
        }
    }

    /// Consume a run of modifier keywords, collecting their indices.
    pub(crate) fn parse_modifiers(&self, cursor: &mut Cursor<'src>, into: &mut Vec<TokenIndex>) {
        while cursor.kind().is_modifier() {
            into.push(cursor.index());
            cursor.advance();
        }
    }
}

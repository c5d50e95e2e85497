//! Token records and the per-unit token arena
//!
//! A [`TokenSource`] owns the immutable token sequence of one translation
//! unit. Everything downstream refers to tokens by [`TokenIndex`], never by
//! reference, so the AST can outlive any cursor and be moved freely as long
//! as the source travels with it.

use super::lexer::{LexError, Lexer};
use std::fmt;

/// Position of a token inside its [`TokenSource`].
pub type TokenIndex = usize;

/// Closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Brackets
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LAngle,
    RAngle,

    // Keywords
    Class,
    Enum,
    Namespace,
    Template,
    Operator,
    Typedef,
    Using,
    Friend,
    Public,
    Private,
    Protected,
    Const,
    Volatile,
    Static,
    Virtual,
    Mutable,
    Inline,
    Extern,
    Explicit,
    Constexpr,
    Unsigned,
    Signed,
    Long,
    Short,
    Void,
    BuiltinType,

    // Punctuation
    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    Equals,
    Asterisk,
    Ampersand,
    DoubleAmpersand,
    Tilde,
    Hash,

    // Words and literals
    Identifier,
    Number,
    Literal,
    Symbol,

    // Trivia
    Whitespace,
    Newline,
    CommentSingleLine,
    CommentMultiLine,

    EndOfStream,
}

impl TokenKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::CommentSingleLine
                | TokenKind::CommentMultiLine
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::CommentSingleLine | TokenKind::CommentMultiLine
        )
    }

    /// Keywords that may appear anywhere around a base type name.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Const
                | TokenKind::Volatile
                | TokenKind::Static
                | TokenKind::Virtual
                | TokenKind::Mutable
                | TokenKind::Inline
                | TokenKind::Extern
                | TokenKind::Explicit
                | TokenKind::Constexpr
                | TokenKind::Unsigned
                | TokenKind::Signed
                | TokenKind::Long
                | TokenKind::Short
        )
    }

    pub fn is_closing_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen | TokenKind::RAngle
        )
    }

    /// Built-in type names, which can never be namespace-qualified.
    pub fn is_builtin_type(self) -> bool {
        matches!(self, TokenKind::BuiltinType | TokenKind::Void)
    }

    /// Tokens that read as a word and need a separating space when joined.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::Literal
                | TokenKind::BuiltinType
                | TokenKind::Void
                | TokenKind::Class
                | TokenKind::Enum
                | TokenKind::Namespace
                | TokenKind::Template
                | TokenKind::Operator
                | TokenKind::Typedef
                | TokenKind::Using
                | TokenKind::Friend
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
        ) || self.is_modifier()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Class => "'class'",
            TokenKind::Enum => "'enum'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::Template => "'template'",
            TokenKind::Operator => "'operator'",
            TokenKind::Typedef => "'typedef'",
            TokenKind::Using => "'using'",
            TokenKind::Friend => "'friend'",
            TokenKind::Public => "'public'",
            TokenKind::Private => "'private'",
            TokenKind::Protected => "'protected'",
            TokenKind::Const => "'const'",
            TokenKind::Volatile => "'volatile'",
            TokenKind::Static => "'static'",
            TokenKind::Virtual => "'virtual'",
            TokenKind::Mutable => "'mutable'",
            TokenKind::Inline => "'inline'",
            TokenKind::Extern => "'extern'",
            TokenKind::Explicit => "'explicit'",
            TokenKind::Constexpr => "'constexpr'",
            TokenKind::Unsigned => "'unsigned'",
            TokenKind::Signed => "'signed'",
            TokenKind::Long => "'long'",
            TokenKind::Short => "'short'",
            TokenKind::Void => "'void'",
            TokenKind::BuiltinType => "built-in type",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::DoubleColon => "'::'",
            TokenKind::Equals => "'='",
            TokenKind::Asterisk => "'*'",
            TokenKind::Ampersand => "'&'",
            TokenKind::DoubleAmpersand => "'&&'",
            TokenKind::Tilde => "'~'",
            TokenKind::Hash => "'#'",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Literal => "literal",
            TokenKind::Symbol => "symbol",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::CommentSingleLine => "line comment",
            TokenKind::CommentMultiLine => "block comment",
            TokenKind::EndOfStream => "end of stream",
        };
        f.write_str(text)
    }
}

/// Raw lexer output: a kind and the exact source text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub text: String,
}

impl Lexeme {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A token as stored in a [`TokenSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Literal => write!(f, "literal {}", self.text),
            TokenKind::BuiltinType | TokenKind::Symbol => write!(f, "'{}'", self.text),
            kind => write!(f, "{kind}"),
        }
    }
}

/// The immutable token sequence of one translation unit.
///
/// The last token is always an [`TokenKind::EndOfStream`] sentinel, so
/// [`TokenSource::get`] can hand out a valid token for any index.
#[derive(Debug, Clone)]
pub struct TokenSource {
    tokens: Vec<Token>,
}

impl TokenSource {
    /// Build a source from lexer output, numbering lines from 1.
    ///
    /// Anything after the first end-of-stream lexeme is dropped and a
    /// sentinel is appended when the input has none.
    pub fn new<I>(lexemes: I) -> Self
    where
        I: IntoIterator<Item = Lexeme>,
    {
        let mut tokens = Vec::new();
        let mut line = 1;

        for lexeme in lexemes {
            let kind = lexeme.kind;
            tokens.push(Token {
                kind,
                text: lexeme.text,
                line,
            });

            match kind {
                TokenKind::EndOfStream => return Self { tokens },
                TokenKind::Newline => line += 1,
                TokenKind::CommentMultiLine => {
                    line += tokens[tokens.len() - 1].text.matches('\n').count();
                }
                _ => {}
            }
        }

        tokens.push(Token {
            kind: TokenKind::EndOfStream,
            text: String::new(),
            line,
        });
        Self { tokens }
    }

    /// Lex `text` and build a source from the result.
    pub fn from_text(text: &str) -> Result<Self, LexError> {
        let lexemes = Lexer::new(text).tokenize()?;
        Ok(Self::new(lexemes))
    }

    /// Token at `index`; indices past the end resolve to the sentinel.
    pub fn get(&self, index: TokenIndex) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    pub fn text(&self, index: TokenIndex) -> &str {
        &self.get(index).text
    }

    pub fn kind(&self, index: TokenIndex) -> TokenKind {
        self.get(index).kind
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens, sentinel included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: the sentinel is always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last_index(&self) -> TokenIndex {
        self.tokens.len() - 1
    }

    /// Join the text of `indices` with `separator`.
    pub fn concat(&self, indices: &[TokenIndex], separator: &str) -> String {
        indices
            .iter()
            .map(|&index| self.text(index))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Join the text of `indices`, inserting a space only between two
    /// adjacent word tokens (`unsigned int`, but `new[]`).
    pub fn concat_words(&self, indices: &[TokenIndex]) -> String {
        let mut text = String::new();
        let mut previous_word = false;
        for &index in indices {
            let token = self.get(index);
            let word = token.kind.is_word();
            if word && previous_word {
                text.push(' ');
            }
            text.push_str(&token.text);
            previous_word = word;
        }
        text
    }

    /// Concatenated text of an opaque span with surrounding whitespace removed.
    pub fn span_text(&self, span: &[TokenIndex]) -> String {
        self.concat(span, "").trim().to_string()
    }
}

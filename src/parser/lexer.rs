//! Lexer for C++-family header text
//!
//! Converts raw source text into a flat [`Lexeme`] stream. Unlike a compiler
//! front end, nothing is thrown away: whitespace runs, newlines and comments
//! are emitted as trivia tokens so that opaque spans (function bodies,
//! initializers) can be reproduced verbatim and line numbers can be derived
//! from the token stream alone.

use super::token::{Lexeme, TokenKind};
use thiserror::Error;

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Lexer for C++-family source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input, ending with an end-of-stream lexeme.
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut lexemes = Vec::new();

        // A UTF-8 byte order mark carries no meaning for the parser.
        if self.peek() == Some('\u{feff}') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            let start = self.position;
            let kind = self.next_kind(ch)?;
            let text: String = self.input[start..self.position].iter().collect();
            lexemes.push(Lexeme::new(kind, text));
        }

        lexemes.push(Lexeme::new(TokenKind::EndOfStream, ""));
        Ok(lexemes)
    }

    /// Consume one token starting at `ch` and classify it.
    fn next_kind(&mut self, ch: char) -> Result<TokenKind, LexError> {
        let (line, column) = (self.line, self.column);
        self.advance();

        let kind = match ch {
            '\n' => TokenKind::Newline,
            ' ' | '\t' | '\r' | '\u{b}' | '\u{c}' => {
                while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\u{b}' | '\u{c}')) {
                    self.advance();
                }
                TokenKind::Whitespace
            }

            '/' if self.peek() == Some('/') => {
                while let Some(next) = self.peek() {
                    if next == '\n' {
                        break;
                    }
                    self.advance();
                }
                TokenKind::CommentSingleLine
            }
            '/' if self.peek() == Some('*') => {
                self.advance();
                self.block_comment(line, column)?
            }

            '"' | '\'' => self.quoted_literal(ch, line, column)?,

            '0'..='9' => {
                self.number_tail();
                TokenKind::Number
            }
            '.' if self.peek().is_some_and(|next| next.is_ascii_digit()) => {
                self.number_tail();
                TokenKind::Number
            }

            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(),

            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '>' => TokenKind::RAngle,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            '#' => TokenKind::Hash,

            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    TokenKind::DoubleColon
                } else {
                    TokenKind::Colon
                }
            }
            '<' => {
                if self.match_any(&["<=", "<", "="]) {
                    TokenKind::Symbol
                } else {
                    TokenKind::LAngle
                }
            }
            '=' => {
                if self.match_any(&["="]) {
                    TokenKind::Symbol
                } else {
                    TokenKind::Equals
                }
            }
            '*' => {
                if self.match_any(&["="]) {
                    TokenKind::Symbol
                } else {
                    TokenKind::Asterisk
                }
            }
            '&' => {
                if self.match_any(&["="]) {
                    TokenKind::Symbol
                } else if self.match_any(&["&"]) {
                    TokenKind::DoubleAmpersand
                } else {
                    TokenKind::Ampersand
                }
            }

            '-' => {
                self.match_any(&[">*", ">", "-", "="]);
                TokenKind::Symbol
            }
            '+' => {
                self.match_any(&["+", "="]);
                TokenKind::Symbol
            }
            '.' => {
                self.match_any(&["..", "*"]);
                TokenKind::Symbol
            }
            '|' => {
                self.match_any(&["|", "="]);
                TokenKind::Symbol
            }
            '!' | '/' | '%' | '^' => {
                self.match_any(&["="]);
                TokenKind::Symbol
            }

            // Anything else (`?`, `@`, `$`, `\`, non-ASCII) is kept as an
            // opaque symbol rather than rejected.
            _ => TokenKind::Symbol,
        };

        Ok(kind)
    }

    /// Scan a block comment body after `/*`.
    fn block_comment(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(TokenKind::CommentMultiLine);
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            line,
            column,
        })
    }

    /// Scan a string or character literal after its opening quote.
    /// Escapes are kept verbatim.
    fn quoted_literal(
        &mut self,
        quote: char,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, LexError> {
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '\n' => break,
                _ if ch == quote => {
                    self.advance();
                    return Ok(TokenKind::Literal);
                }
                _ => {
                    self.advance();
                }
            }
        }

        let what = if quote == '"' { "string" } else { "character" };
        Err(LexError {
            message: format!("Unterminated {what} literal"),
            line,
            column,
        })
    }

    /// Numbers absorb digits, letters, `.` and digit separators, which
    /// covers hex, exponents, suffixes and `1'000`.
    fn number_tail(&mut self) {
        while let Some(ch) = self.peek() {
            let exponent_sign = matches!(ch, '+' | '-')
                && matches!(
                    self.input.get(self.position.wrapping_sub(1)),
                    Some('e' | 'E' | 'p' | 'P')
                );
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '\'' || ch == '_' || exponent_sign {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.position - 1;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let word: String = self.input[start..self.position].iter().collect();
        match word.as_str() {
            "class" => TokenKind::Class,
            "enum" => TokenKind::Enum,
            "namespace" => TokenKind::Namespace,
            "template" => TokenKind::Template,
            "operator" => TokenKind::Operator,
            "typedef" => TokenKind::Typedef,
            "using" => TokenKind::Using,
            "friend" => TokenKind::Friend,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "protected" => TokenKind::Protected,
            "const" => TokenKind::Const,
            "volatile" => TokenKind::Volatile,
            "static" => TokenKind::Static,
            "virtual" => TokenKind::Virtual,
            "mutable" => TokenKind::Mutable,
            "inline" => TokenKind::Inline,
            "extern" => TokenKind::Extern,
            "explicit" => TokenKind::Explicit,
            "constexpr" => TokenKind::Constexpr,
            "unsigned" => TokenKind::Unsigned,
            "signed" => TokenKind::Signed,
            "long" => TokenKind::Long,
            "short" => TokenKind::Short,
            "void" => TokenKind::Void,
            "bool" | "char" | "int" | "float" | "double" | "wchar_t" | "char8_t"
            | "char16_t" | "char32_t" | "auto" => TokenKind::BuiltinType,
            _ => TokenKind::Identifier,
        }
    }

    /// Consume the first of `tails` that follows the current position.
    fn match_any(&mut self, tails: &[&str]) -> bool {
        for tail in tails {
            let matches = tail
                .chars()
                .enumerate()
                .all(|(offset, expected)| self.peek_ahead(offset) == Some(expected));
            if matches {
                for _ in tail.chars() {
                    self.advance();
                }
                return true;
            }
        }
        false
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|lexeme| lexeme.kind)
            .filter(|kind| !kind.is_trivia())
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("class Foo { int x; };"),
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::LBrace,
                TokenKind::BuiltinType,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_trivia_is_preserved() {
        let lexemes = Lexer::new("a // note\n  b").tokenize().unwrap();
        let all: Vec<TokenKind> = lexemes.iter().map(|l| l.kind).collect();
        assert_eq!(
            all,
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::CommentSingleLine,
                TokenKind::Newline,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::EndOfStream,
            ]
        );
        let text: String = lexemes.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(text, "a // note\n  b");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds(":: : == = <= << < >> -> ..."),
            vec![
                TokenKind::DoubleColon,
                TokenKind::Colon,
                TokenKind::Symbol,
                TokenKind::Equals,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::LAngle,
                TokenKind::RAngle,
                TokenKind::RAngle,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_double_ampersand_is_one_token() {
        assert_eq!(
            kinds("Foo&& x & y &= z"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleAmpersand,
                TokenKind::Identifier,
                TokenKind::Ampersand,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_numbers_and_literals() {
        let lexemes = Lexer::new("0x1F 1.5e-3f 1'000 \"a\\\"b\" 'c'").tokenize().unwrap();
        let texts: Vec<&str> = lexemes
            .iter()
            .filter(|l| !l.kind.is_trivia() && l.kind != TokenKind::EndOfStream)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(texts, vec!["0x1F", "1.5e-3f", "1'000", "\"a\\\"b\"", "'c'"]);
    }

    #[test]
    fn test_keywords_and_builtins() {
        assert_eq!(
            kinds("unsigned long int void operator"),
            vec![
                TokenKind::Unsigned,
                TokenKind::Long,
                TokenKind::BuiltinType,
                TokenKind::Void,
                TokenKind::Operator,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("int x;\n/* open").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("block comment"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("x = \"abc\n").tokenize().unwrap_err();
        assert!(err.message.contains("string"));
    }
}

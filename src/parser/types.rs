//! Type expression parsing
//!
//! Builds an [`AstType`] from the tokens of a type expression:
//!
//! ```text
//! type        ::= base_type template_args? pointer* array_dim*
//! base_type   ::= (modifier | name | name "::")+
//! pointer     ::= ("*" | "&" | "&&") ("const" | "volatile")*
//! array_dim   ::= "[" opaque "]"
//! ```
//!
//! The base type holds at most one name. A second identifier after the name
//! is the declarator and ends the type; `::` turns the name seen so far into
//! a namespace qualifier.

use crate::parser::ast::*;
use crate::parser::combine::capture_scope;
use crate::parser::cursor::{Cursor, Filter};
use crate::parser::parse::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::parser::token::{TokenIndex, TokenKind};

impl<'src> Parser<'src> {
    /// Parse modifiers, namespace qualifiers and the type name.
    ///
    /// Returns `Ok(None)` (cursor untouched) when no name was found.
    pub(crate) fn parse_base_type(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<AstType>> {
        let mut pos = *cursor;
        let mut ty = AstType::default();

        loop {
            let kind = pos.kind();
            match kind {
                TokenKind::Identifier => {
                    if ty.name.is_some() {
                        // the declarator name
                        break;
                    }
                    ty.name = Some(pos.index());
                }
                k if k.is_builtin_type() => match ty.name {
                    None => ty.name = Some(pos.index()),
                    Some(name) if self.source.kind(name).is_builtin_type() => {
                        return Err(ParseError::at(
                            ParseErrorKind::DuplicateBuiltinType {
                                first: self.source.text(name).to_string(),
                                second: pos.text().to_string(),
                            },
                            &pos,
                        ));
                    }
                    Some(_) => return Ok(None),
                },
                k if k.is_modifier() => ty.modifiers.push(pos.index()),
                TokenKind::DoubleColon => match ty.name.take() {
                    Some(name) if self.source.kind(name).is_builtin_type() => {
                        return Err(ParseError::at(
                            ParseErrorKind::NamespacedBuiltin {
                                name: self.source.text(name).to_string(),
                            },
                            &pos,
                        ));
                    }
                    Some(name) => ty.namespaces.push(name),
                    // leading `::` names the global namespace
                    None => {}
                },
                _ => break,
            }
            pos.advance();
        }

        if ty.name.is_none() {
            return Ok(None);
        }
        *cursor = pos;
        Ok(Some(ty))
    }

    /// Opaque `<...>` span after a base type.
    ///
    /// Only taken when a balanced `>` appears before any top-level `;`, `{`,
    /// `}` or end of stream, so a stray `<` in skipped code is never mistaken
    /// for an unterminated template argument list.
    pub(crate) fn parse_template_args(
        &self,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<Vec<TokenIndex>>> {
        if !cursor.is(TokenKind::LAngle) || !self.angle_scope_closes(*cursor) {
            return Ok(None);
        }
        capture_scope(cursor, TokenKind::LAngle, TokenKind::RAngle, Filter::HideComments)
    }

    /// Template arguments plus any qualifiers written after them
    /// (`std::vector<int> const`).
    pub(crate) fn parse_template_suffix(
        &self,
        cursor: &mut Cursor<'src>,
        ty: &mut AstType,
    ) -> ParseResult<()> {
        ty.template_args = self.parse_template_args(cursor)?;
        if ty.template_args.is_some() {
            self.parse_modifiers(cursor, &mut ty.modifiers);
        }
        Ok(())
    }

    /// Bounded lookahead for a matching `>`.
    pub(crate) fn angle_scope_closes(&self, mut pos: Cursor<'src>) -> bool {
        let mut depth = 0usize;
        loop {
            match pos.kind() {
                TokenKind::LAngle => depth += 1,
                TokenKind::RAngle => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                TokenKind::Semicolon
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::EndOfStream => return false,
                _ => {}
            }
            pos.advance();
        }
    }

    /// One `*`, `&` or `&&` with its trailing qualifiers.
    pub(crate) fn parse_pointer(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<PointerType>> {
        let kind = match cursor.kind() {
            TokenKind::Asterisk => PointerKind::Pointer,
            TokenKind::Ampersand => PointerKind::Reference,
            TokenKind::DoubleAmpersand => PointerKind::RvalueReference,
            _ => return Ok(None),
        };

        let mut pos = *cursor;
        pos.advance();

        let mut modifiers = Vec::new();
        while pos.is(TokenKind::Const) || pos.is(TokenKind::Volatile) {
            if kind != PointerKind::Pointer {
                return Err(ParseError::at(ParseErrorKind::ReferenceModifier, &pos));
            }
            modifiers.push(pos.index());
            pos.advance();
        }

        *cursor = pos;
        Ok(Some(PointerType { kind, modifiers }))
    }

    /// Zero or more pointer/reference levels, appended in source order.
    pub(crate) fn parse_pointers_and_references(
        &self,
        cursor: &mut Cursor<'src>,
        ty: &mut AstType,
    ) -> ParseResult<bool> {
        let mut found = false;
        while let Some(pointer) = self.parse_pointer(cursor)? {
            ty.pointers.push(pointer);
            found = true;
        }
        Ok(found)
    }

    /// Zero or more `[...]` dimensions, outer to inner. Not evaluated.
    pub(crate) fn parse_array_dimensions(
        &self,
        cursor: &mut Cursor<'src>,
        ty: &mut AstType,
    ) -> ParseResult<bool> {
        let mut found = false;
        while let Some(span) =
            capture_scope(cursor, TokenKind::LBracket, TokenKind::RBracket, Filter::HideComments)?
        {
            ty.array_dimensions.push(span);
            found = true;
        }
        Ok(found)
    }

    /// A complete type expression without a declarator name.
    pub fn parse_type(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<AstType>> {
        let mut pos = *cursor;
        let Some(mut ty) = self.parse_base_type(&mut pos)? else {
            return Ok(None);
        };
        self.parse_template_suffix(&mut pos, &mut ty)?;
        self.parse_pointers_and_references(&mut pos, &mut ty)?;
        self.parse_array_dimensions(&mut pos, &mut ty)?;

        *cursor = pos;
        Ok(Some(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::TokenSource;

    fn shape_of(text: &str) -> TypeShape {
        let source = TokenSource::from_text(text).unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let ty = parser.parse_type(&mut cursor).unwrap().unwrap();
        ty.describe(&source)
    }

    #[test]
    fn test_modifiers_interleave_with_name() {
        let shape = shape_of("static int const");
        assert_eq!(shape.name.as_deref(), Some("int"));
        assert_eq!(shape.modifiers, vec!["static", "const"]);
    }

    #[test]
    fn test_namespace_qualifiers() {
        let shape = shape_of("const ::outer::inner::Widget");
        assert_eq!(shape.name.as_deref(), Some("Widget"));
        assert_eq!(shape.namespaces, vec!["outer", "inner"]);
    }

    #[test]
    fn test_second_identifier_ends_type() {
        let source = TokenSource::from_text("Foo bar").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let ty = parser.parse_base_type(&mut cursor).unwrap().unwrap();
        assert_eq!(ty.name(&source), Some("Foo"));
        assert_eq!(cursor.text(), "bar");
    }

    #[test]
    fn test_namespaced_builtin_is_fatal() {
        let source = TokenSource::from_text("int::x").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let err = parser.parse_base_type(&mut cursor).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::NamespacedBuiltin {
                name: "int".to_string()
            }
        );
    }

    #[test]
    fn test_two_builtins_is_fatal() {
        let source = TokenSource::from_text("int float x").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let err = parser.parse_base_type(&mut cursor).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::DuplicateBuiltinType { .. }));
    }

    #[test]
    fn test_no_name_leaves_cursor() {
        let source = TokenSource::from_text("const * x").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        assert!(parser.parse_base_type(&mut cursor).unwrap().is_none());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_pointer_chain_order() {
        let shape = shape_of("char * const * volatile &");
        assert_eq!(
            shape.pointers,
            vec![
                (PointerKind::Pointer, vec!["const".to_string()]),
                (PointerKind::Pointer, vec!["volatile".to_string()]),
                (PointerKind::Reference, vec![]),
            ]
        );
    }

    #[test]
    fn test_const_reference_is_fatal() {
        let source = TokenSource::from_text("int & const").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let err = parser.parse_type(&mut cursor).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReferenceModifier);
    }

    #[test]
    fn test_rvalue_reference() {
        let source = TokenSource::from_text("Foo&& x").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let ty = parser.parse_type(&mut cursor).unwrap().unwrap();
        assert_eq!(ty.render(&source), "Foo &&");
        assert_eq!(
            ty.describe(&source).pointers,
            vec![(PointerKind::RvalueReference, vec![])]
        );
        assert_eq!(cursor.text(), "x");
    }

    #[test]
    fn test_const_rvalue_reference_is_fatal() {
        let source = TokenSource::from_text("int && const").unwrap();
        let parser = Parser::new(&source);
        let err = parser.parse_type(&mut Cursor::new(&source)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReferenceModifier);
    }

    #[test]
    fn test_array_dimensions_are_opaque() {
        let shape = shape_of("int [N * 2][3]");
        assert_eq!(shape.array_dimensions, vec!["N * 2", "3"]);
    }

    #[test]
    fn test_template_args_span() {
        let shape = shape_of("std::map<int, std::vector<char>> *");
        assert_eq!(shape.name.as_deref(), Some("map"));
        assert_eq!(shape.template_args.as_deref(), Some("int, std::vector<char>"));
        assert_eq!(shape.pointers.len(), 1);
    }

    #[test]
    fn test_qualifier_after_template_args() {
        let shape = shape_of("std::vector<int> const &");
        assert_eq!(shape.modifiers, vec!["const"]);
        assert_eq!(shape.pointers, vec![(PointerKind::Reference, vec![])]);
    }

    #[test]
    fn test_unclosed_angle_is_not_template() {
        let source = TokenSource::from_text("a < b ;").unwrap();
        let parser = Parser::new(&source);
        let mut cursor = Cursor::new(&source);
        let ty = parser.parse_type(&mut cursor).unwrap().unwrap();
        assert!(ty.template_args.is_none());
        assert!(cursor.is(TokenKind::LAngle));
    }

    #[test]
    fn test_render_then_reparse_is_stable() {
        for text in [
            "int",
            "const unsigned long long int",
            "volatile ns::inner::Thing * const * &",
            "std::map<std::string, int> const &",
            "std::string &&",
            "char[16][N + 1]",
            "static constexpr double * volatile[4]",
        ] {
            let source = TokenSource::from_text(text).unwrap();
            let parser = Parser::new(&source);
            let ty = parser
                .parse_type(&mut Cursor::new(&source))
                .unwrap()
                .unwrap();
            let rendered = ty.render(&source);

            let again = TokenSource::from_text(&rendered).unwrap();
            let reparsed = Parser::new(&again)
                .parse_type(&mut Cursor::new(&again))
                .unwrap()
                .unwrap();
            assert_eq!(
                reparsed.describe(&again),
                ty.describe(&source),
                "{text} rendered as {rendered}"
            );
        }
    }
}

//! Class, enum and namespace parsing
//!
//! ```text
//! class_def    ::= "class" NAME "final"? (":" base ("," base)*)? "{" member* "}" ";"
//!                | "class" NAME ";"
//! base         ::= access? "virtual"? access? qualified_name template_args?
//! member       ::= access ":" | template_prefix | friend | typedef | using
//!                | declaration | ctor_dtor | class_def | enum_def | directive
//! friend       ::= "friend" (class_def | declaration | opaque ";")
//! ctor_dtor    ::= modifier* (NAME "::")? "~"? NAME modifier* "(" arguments ")"
//!                  (":" member_init ("," member_init)*)? finalizer
//! member_init  ::= NAME ("(" opaque ")" | "{" opaque "}")
//! enum_def     ::= "enum" "class"? NAME? (":" underlying)? ("{" entries "}")? ";"
//! namespace    ::= "namespace" (NAME ("::" NAME)*)? "{" root_item* "}"
//! linkage      ::= "extern" LITERAL ("{" root_item* "}")?
//! ```
//!
//! Bodies that reach end of stream are fatal and reported at the line of
//! their opening brace.

use crate::parser::ast::*;
use crate::parser::combine::{capture_scope, combine_while};
use crate::parser::cursor::{Cursor, Filter};
use crate::parser::parse::{Diagnostic, ParseError, ParseErrorKind, ParseResult, Parser};
use crate::parser::token::{TokenIndex, TokenKind};

impl<'src> Parser<'src> {
    /// Parse a class definition (or skip a forward declaration).
    pub(crate) fn parse_class(
        &mut self,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Class) {
            return Ok(false);
        }

        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        if !pos.is(TokenKind::Identifier) {
            return Err(ParseError::at(ParseErrorKind::ExpectedClassName, &pos));
        }
        let name = pos.text();
        pos.advance();

        if self.match_token(&mut pos, TokenKind::Semicolon) {
            tracing::debug!(target: "declscan::parser", line, "skipping forward declaration of class {}", name);
            *cursor = pos;
            return Ok(true);
        }

        if pos.is(TokenKind::Identifier) && pos.text() == "final" {
            pos.advance();
        }

        let mut class = AstNode::new(NodeKind::Class, line).with_data(name);
        if self.match_token(&mut pos, TokenKind::Colon) {
            self.parse_class_inheritance(&mut pos, &mut class)?;
        }

        if !pos.is(TokenKind::LBrace) {
            return Err(ParseError::at(
                ParseErrorKind::ExpectedClassBody {
                    found: pos.text().to_string(),
                },
                &pos,
            ));
        }
        self.parse_class_body(&mut pos, &mut class)?;

        if !self.match_token(&mut pos, TokenKind::Semicolon) {
            return Err(ParseError::at(
                ParseErrorKind::MissingSemicolon { construct: "class" },
                &pos,
            ));
        }

        parent.push_node(class);
        *cursor = pos;
        Ok(true)
    }

    /// Comma-separated base list after `:`. Each base without an access
    /// token is private.
    fn parse_class_inheritance(
        &self,
        cursor: &mut Cursor<'src>,
        class: &mut AstNode,
    ) -> ParseResult<()> {
        loop {
            let mut visibility = Visibility::Private;
            if let Some(access) = Visibility::from_token(cursor.kind()) {
                visibility = access;
                cursor.advance();
            }
            if self.match_token(cursor, TokenKind::Virtual) {
                if let Some(access) = Visibility::from_token(cursor.kind()) {
                    visibility = access;
                    cursor.advance();
                }
            }

            let line = cursor.line();
            let Some(base) = self.parse_qualified_name(cursor)? else {
                return Err(ParseError::at(
                    ParseErrorKind::ExpectedClassBody {
                        found: cursor.text().to_string(),
                    },
                    cursor,
                ));
            };
            class.push_node(
                AstNode::new(NodeKind::Inherit, line)
                    .with_data(visibility.as_str())
                    .with_data(base),
            );

            if !self.match_token(cursor, TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// `A::B<args>` as text.
    fn parse_qualified_name(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<String>> {
        let mut pos = *cursor;
        let mut segments: Vec<TokenIndex> = Vec::new();
        while pos.is(TokenKind::Identifier) {
            segments.push(pos.index());
            pos.advance();
            if !pos.is(TokenKind::DoubleColon) {
                break;
            }
            pos.advance();
        }
        if segments.is_empty() {
            return Ok(None);
        }

        let mut name = self.source.concat(&segments, "::");
        if let Some(args) = self.parse_template_args(&mut pos)? {
            name.push('<');
            name.push_str(&self.source.span_text(&args));
            name.push('>');
        }
        *cursor = pos;
        Ok(Some(name))
    }

    /// Members between `{` and `}`, tracking the running access level.
    fn parse_class_body(&mut self, cursor: &mut Cursor<'src>, class: &mut AstNode) -> ParseResult<()> {
        let open_line = cursor.line();
        let mut pos = *cursor;
        pos.advance();

        let mut visibility = Visibility::Private;
        loop {
            if pos.at_end() {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedScope {
                        open: TokenKind::LBrace,
                    },
                    open_line,
                ));
            }
            if self.match_token(&mut pos, TokenKind::RBrace) {
                break;
            }
            if let Some(access) = self.parse_access_specifier(&mut pos) {
                visibility = access;
                continue;
            }

            if self.parse_template_prefix(&mut pos)?
                || self.parse_friend(&mut pos)?
                || self.parse_typedef(visibility, &mut pos, class)?
                || self.parse_using(visibility, &mut pos, class)?
                || self.parse_declaration(visibility, &mut pos, class)?
                || self.parse_constructor_destructor(visibility, &mut pos, class)?
                || self.parse_class(&mut pos, class)?
                || self.parse_enum(&mut pos, class)?
                || self.parse_preprocessor(&mut pos)
                || self.parse_ignored(&mut pos)
            {
                continue;
            }
            self.parse_unknown(&mut pos);
        }

        *cursor = pos;
        Ok(())
    }

    /// `friend` declarations grant access; they declare no member, so the
    /// whole declaration (body included) is consumed without a node.
    pub(crate) fn parse_friend(&mut self, cursor: &mut Cursor<'src>) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Friend) {
            return Ok(false);
        }
        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        let mut discarded = AstNode::new(NodeKind::File, line);
        let matched = self.parse_class(&mut pos, &mut discarded)?
            || self.parse_declaration(Visibility::Private, &mut pos, &mut discarded)?
            || {
                self.capture_value(&mut pos, |kind| kind == TokenKind::Semicolon)?;
                self.match_token(&mut pos, TokenKind::Semicolon)
            };
        if !matched {
            return Ok(false);
        }

        tracing::debug!(target: "declscan::parser", line, "skipping friend declaration");
        *cursor = pos;
        Ok(true)
    }

    /// `public:`, `private:` or `protected:`.
    pub(crate) fn parse_access_specifier(&self, cursor: &mut Cursor<'src>) -> Option<Visibility> {
        let visibility = Visibility::from_token(cursor.kind())?;
        let mut pos = *cursor;
        pos.advance();
        if !self.match_token(&mut pos, TokenKind::Colon) {
            return None;
        }
        *cursor = pos;
        Some(visibility)
    }

    /// Constructor or destructor of the enclosing class.
    pub(crate) fn parse_constructor_destructor(
        &self,
        visibility: Visibility,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if parent.kind != NodeKind::Class {
            return Ok(false);
        }
        let Some(class_name) = parent.name().map(str::to_string) else {
            return Ok(false);
        };

        let mut pos = *cursor;
        let line = pos.line();
        let mut modifiers = Vec::new();
        self.parse_modifiers(&mut pos, &mut modifiers);

        // out-of-line style `Class::Class`
        if pos.text() == class_name && pos.peek().kind == TokenKind::DoubleColon {
            pos.advance();
            pos.advance();
        }

        let destructor = self.match_token(&mut pos, TokenKind::Tilde);
        if !pos.is(TokenKind::Identifier) || pos.text() != class_name {
            return Ok(false);
        }
        pos.advance();
        self.parse_modifiers(&mut pos, &mut modifiers);

        let kind = if destructor {
            NodeKind::Destructor
        } else {
            NodeKind::Constructor
        };
        let mut node = AstNode::new(kind, line)
            .with_data(visibility.as_str())
            .with_data(class_name);

        if !self.parse_function_arguments(&mut pos, &mut node)? {
            return Ok(false);
        }

        if pos.is(TokenKind::Colon) {
            if destructor {
                return Err(ParseError::at(ParseErrorKind::DestructorInitializer, &pos));
            }
            pos.advance();
            while let Some(initializer) = self.parse_constructor_initializer(&mut pos)? {
                node.push_node(initializer);
                if !self.match_token(&mut pos, TokenKind::Comma) {
                    break;
                }
            }
        }

        if self.parse_function_finalizer(&mut pos, &mut node)?.is_none() {
            return Ok(false);
        }

        node.set_type(AstType {
            modifiers,
            ..AstType::default()
        });
        parent.push_node(node);
        *cursor = pos;
        Ok(true)
    }

    /// `member(args)` or `member{args}` in a constructor's initializer list.
    pub(crate) fn parse_constructor_initializer(
        &self,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<AstNode>> {
        if !cursor.is(TokenKind::Identifier) {
            return Ok(None);
        }
        let mut pos = *cursor;
        let line = pos.line();
        let member = pos.text();
        pos.advance();

        let span = match pos.kind() {
            TokenKind::LParen => {
                capture_scope(&mut pos, TokenKind::LParen, TokenKind::RParen, Filter::HideComments)?
            }
            TokenKind::LBrace => {
                capture_scope(&mut pos, TokenKind::LBrace, TokenKind::RBrace, Filter::HideComments)?
            }
            _ => None,
        };
        let Some(span) = span else {
            return Ok(None);
        };

        *cursor = pos;
        Ok(Some(
            AstNode::new(NodeKind::ConstructorInitializer, line)
                .with_data(member)
                .with_data(self.source.span_text(&span)),
        ))
    }

    /// Parse an enum or enum class definition.
    pub(crate) fn parse_enum(
        &mut self,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Enum) {
            return Ok(false);
        }

        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        let scoped = self.match_token(&mut pos, TokenKind::Class);
        let name = if pos.is(TokenKind::Identifier) {
            let name = pos.text();
            pos.advance();
            Some(name)
        } else {
            None
        };
        if name.is_none() && !pos.is(TokenKind::LBrace) && !pos.is(TokenKind::Colon) {
            return Err(ParseError::at(
                ParseErrorKind::ExpectedEnumName {
                    found: pos.text().to_string(),
                },
                &pos,
            ));
        }

        let mut underlying = None;
        if self.match_token(&mut pos, TokenKind::Colon) {
            let text = combine_while(&mut pos, Filter::HideComments, |token| {
                !matches!(token.kind, TokenKind::LBrace | TokenKind::Semicolon)
            });
            let text = text.trim();
            if text.is_empty() {
                return Err(ParseError::at(
                    ParseErrorKind::ExpectedEnumBody {
                        found: pos.text().to_string(),
                    },
                    &pos,
                ));
            }
            underlying = Some(text.to_string());
        }

        if let Some(name) = name {
            if self.match_token(&mut pos, TokenKind::Semicolon) {
                tracing::debug!(target: "declscan::parser", line, "skipping forward declaration of enum {}", name);
                *cursor = pos;
                return Ok(true);
            }
        }

        if !pos.is(TokenKind::LBrace) {
            return Err(ParseError::at(
                ParseErrorKind::ExpectedEnumBody {
                    found: pos.text().to_string(),
                },
                &pos,
            ));
        }
        let open_line = pos.line();
        pos.advance();

        let kind = if scoped {
            NodeKind::EnumClass
        } else {
            NodeKind::Enum
        };
        let mut node = AstNode::new(kind, line).with_data(name.unwrap_or(""));
        if let Some(underlying) = underlying {
            node = node.with_data(underlying);
        }

        loop {
            if pos.at_end() {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedScope {
                        open: TokenKind::LBrace,
                    },
                    open_line,
                ));
            }
            if self.match_token(&mut pos, TokenKind::RBrace) {
                break;
            }
            if let Some(entry) = self.parse_enum_definition(&mut pos)? {
                node.push_node(entry);
                self.match_token(&mut pos, TokenKind::Comma);
                continue;
            }
            if !self.parse_preprocessor(&mut pos) && !self.parse_ignored(&mut pos) {
                self.parse_unknown(&mut pos);
            }
        }

        if !self.match_token(&mut pos, TokenKind::Semicolon) {
            return Err(ParseError::at(
                ParseErrorKind::MissingSemicolon { construct: "enum" },
                &pos,
            ));
        }

        parent.push_node(node);
        *cursor = pos;
        Ok(true)
    }

    /// One enumerator with its optional value.
    pub(crate) fn parse_enum_definition(
        &self,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<AstNode>> {
        if !cursor.is(TokenKind::Identifier) {
            return Ok(None);
        }
        let mut pos = *cursor;
        let mut entry = AstNode::new(NodeKind::EnumDefinition, pos.line()).with_data(pos.text());
        pos.advance();

        if self.match_token(&mut pos, TokenKind::Equals) {
            let line = pos.line();
            let value = self.capture_value(&mut pos, |kind| {
                matches!(
                    kind,
                    TokenKind::Comma | TokenKind::RBrace | TokenKind::Semicolon
                )
            })?;
            entry.push_node(AstNode::new(NodeKind::Init, line).with_data(value));
        }

        *cursor = pos;
        Ok(Some(entry))
    }

    /// `namespace A::B { ... }`, parsed with the top-level rules.
    pub(crate) fn parse_namespace(
        &mut self,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Namespace) {
            return Ok(false);
        }

        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        let mut segments = Vec::new();
        while pos.is(TokenKind::Identifier) {
            segments.push(pos.index());
            pos.advance();
            if !self.match_token(&mut pos, TokenKind::DoubleColon) {
                break;
            }
        }
        // aliases and using-directives
        if !pos.is(TokenKind::LBrace) {
            return Ok(false);
        }
        let open_line = pos.line();
        pos.advance();

        let mut namespace =
            AstNode::new(NodeKind::Namespace, line).with_data(self.source.concat(&segments, "::"));
        loop {
            if pos.at_end() {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedScope {
                        open: TokenKind::LBrace,
                    },
                    open_line,
                ));
            }
            if self.match_token(&mut pos, TokenKind::RBrace) {
                break;
            }
            self.parse_root_item(&mut pos, &mut namespace)?;
        }

        parent.push_node(namespace);
        *cursor = pos;
        Ok(true)
    }

    /// `extern "C" { ... }`: the items join the enclosing scope. A linkage
    /// string in front of a single declaration is stepped over.
    pub(crate) fn parse_linkage_block(
        &mut self,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Extern) || cursor.peek().kind != TokenKind::Literal {
            return Ok(false);
        }
        let mut pos = *cursor;
        pos.advance();
        pos.advance();
        if !pos.is(TokenKind::LBrace) {
            *cursor = pos;
            return Ok(true);
        }
        let open_line = pos.line();
        pos.advance();

        loop {
            if pos.at_end() {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedScope {
                        open: TokenKind::LBrace,
                    },
                    open_line,
                ));
            }
            if self.match_token(&mut pos, TokenKind::RBrace) {
                break;
            }
            self.parse_root_item(&mut pos, parent)?;
        }

        *cursor = pos;
        Ok(true)
    }

    /// `template <...>` ahead of a declaration. The parameter list is
    /// reported and dropped; what follows parses as usual.
    pub(crate) fn parse_template_prefix(&mut self, cursor: &mut Cursor<'src>) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Template) {
            return Ok(false);
        }
        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        let Some(span) = capture_scope(&mut pos, TokenKind::LAngle, TokenKind::RAngle, Filter::HideComments)? else {
            return Ok(false);
        };

        let text = self.source.span_text(&span);
        tracing::info!(target: "declscan::parser", line, "ignoring template scope: <{}>", text);
        self.diagnostics.push(Diagnostic::IgnoredTemplate { line, text });

        *cursor = pos;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{Diagnostic, ParseError, ParseErrorKind, Parser};
    use crate::parser::token::TokenSource;

    fn parse_items(source: &str) -> Result<(AstNode, Vec<Diagnostic>), ParseError> {
        let tokens = TokenSource::from_text(source).unwrap();
        let mut root = AstNode::new(NodeKind::File, 1).with_data("test.h");
        let mut parser = Parser::new(&tokens);
        parser.parse(&mut root)?;
        Ok((root, parser.into_diagnostics()))
    }

    #[test]
    fn test_class_with_base_and_member() {
        let (root, _) = parse_items("class Foo : public Bar { public: int x; };").unwrap();
        let class = root.find(NodeKind::Class, "Foo").unwrap();

        let bases: Vec<&AstNode> = class.nodes_of(NodeKind::Inherit).collect();
        assert_eq!(bases.len(), 1);
        assert_eq!(bases[0].data, vec!["public", "Bar"]);

        let members: Vec<&AstNode> = class.nodes_of(NodeKind::Variable).collect();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name(), Some("x"));
        assert_eq!(members[0].visibility(), Some(Visibility::Public));
    }

    #[test]
    fn test_default_member_visibility_is_private() {
        let (root, _) = parse_items("class A { int a; protected: int b; };").unwrap();
        let class = root.find(NodeKind::Class, "A").unwrap();
        let visibilities: Vec<Option<Visibility>> =
            class.nodes().map(|n| n.visibility()).collect();
        assert_eq!(
            visibilities,
            vec![Some(Visibility::Private), Some(Visibility::Protected)]
        );
    }

    #[test]
    fn test_base_list_defaults_each_base_to_private() {
        let (root, _) =
            parse_items("class D : public A, B, virtual protected ns::C<int> {};").unwrap();
        let class = root.find(NodeKind::Class, "D").unwrap();
        let bases: Vec<&Vec<String>> = class.nodes_of(NodeKind::Inherit).map(|n| &n.data).collect();
        assert_eq!(bases[0], &vec!["public", "A"]);
        assert_eq!(bases[1], &vec!["private", "B"]);
        assert_eq!(bases[2], &vec!["protected", "ns::C<int>"]);
    }

    #[test]
    fn test_constructor_with_member_initializer() {
        let (root, _) = parse_items(
            "class MyClass { public: MyClass::MyClass(int a) : member(a) {} int member; };",
        )
        .unwrap();
        let class = root.find(NodeKind::Class, "MyClass").unwrap();
        let constructor = class.nodes_of(NodeKind::Constructor).next().unwrap();
        assert_eq!(constructor.visibility(), Some(Visibility::Public));

        let initializer = constructor
            .nodes_of(NodeKind::ConstructorInitializer)
            .next()
            .unwrap();
        assert_eq!(initializer.data, vec!["member", "a"]);

        let body = constructor.nodes_of(NodeKind::Definition).next().unwrap();
        assert_eq!(body.text(), Some(""));
        assert_eq!(class.nodes_of(NodeKind::Variable).count(), 1);
    }

    #[test]
    fn test_virtual_destructor() {
        let (root, _) = parse_items("class Base { public: virtual ~Base() = default; };").unwrap();
        let class = root.find(NodeKind::Class, "Base").unwrap();
        let destructor = class.nodes_of(NodeKind::Destructor).next().unwrap();
        assert_eq!(destructor.properties(), vec!["default"]);
    }

    #[test]
    fn test_destructor_initializer_is_fatal() {
        let err = parse_items("class A {\n ~A() : x(1) {}\n};").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DestructorInitializer);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_constructor_outside_class_is_not_recognized() {
        let (root, _) = parse_items("Foo(int a);").unwrap();
        assert!(root.nodes_of(NodeKind::Constructor).next().is_none());
    }

    #[test]
    fn test_missing_class_semicolon_is_fatal() {
        let err = parse_items("class A {\n}\nint x;").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::MissingSemicolon { construct: "class" }
        );
    }

    #[test]
    fn test_unterminated_class_reports_opening_line() {
        let err = parse_items("\nclass A {\n int x;\n void f() {}\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnterminatedScope {
                open: crate::parser::token::TokenKind::LBrace
            }
        );
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_malformed_member_does_not_stop_later_members() {
        let (root, diagnostics) =
            parse_items("class A { int x; ??? + ; int y; };\nint z;").unwrap();
        let class = root.find(NodeKind::Class, "A").unwrap();
        let names: Vec<&str> = class.nodes().filter_map(|n| n.name()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(root.find(NodeKind::Variable, "z").is_some());
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_member_with_unknown_specifier_and_body_is_skipped() {
        let (root, diagnostics) = parse_items(
            "class A { void g() __attribute__((cold)) { return; } int y; };\nclass B { int z; };",
        )
        .unwrap();
        let a = root.find(NodeKind::Class, "A").unwrap();
        let names: Vec<&str> = a.nodes().filter_map(|n| n.name()).collect();
        assert_eq!(names, vec!["y"]);
        assert!(root.find(NodeKind::Class, "B").unwrap().find(NodeKind::Variable, "z").is_some());
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_noexcept_member_with_body() {
        let (root, _) =
            parse_items("class A { void f() noexcept { return; } int y; };\nclass B { int z; };").unwrap();
        let a = root.find(NodeKind::Class, "A").unwrap();
        let f = a.find(NodeKind::Function, "f").unwrap();
        assert!(f.has_property("noexcept"));
        assert!(a.find(NodeKind::Variable, "y").is_some());
        assert!(root.find(NodeKind::Class, "B").is_some());
    }

    #[test]
    fn test_friend_declarations_add_no_members() {
        let (root, _) = parse_items(
            "class A {\n friend void helper(A& a);\n friend class B;\n friend bool operator==(const A&, const A&) { return true; }\n int x;\n};",
        )
        .unwrap();
        let a = root.find(NodeKind::Class, "A").unwrap();
        let names: Vec<&str> = a.nodes().filter_map(|n| n.name()).collect();
        assert_eq!(names, vec!["x"]);
        assert!(root.find(NodeKind::Function, "helper").is_none());
    }

    #[test]
    fn test_member_type_aliases_keep_visibility() {
        let (root, _) =
            parse_items("class A { public: typedef int Id; using Name = std::string; Id id; };").unwrap();
        let a = root.find(NodeKind::Class, "A").unwrap();
        let aliases: Vec<&AstNode> = a.nodes_of(NodeKind::TypeAlias).collect();
        assert_eq!(aliases[0].data, vec!["public", "Id"]);
        assert_eq!(aliases[1].data, vec!["public", "Name"]);
        assert!(a.find(NodeKind::Variable, "id").is_some());
    }

    #[test]
    fn test_linkage_block_items_join_enclosing_scope() {
        let (root, _) =
            parse_items("extern \"C\" {\nint init(void* ctx);\n}\nextern \"C\" int shutdown();").unwrap();
        let names: Vec<&str> = root.nodes().filter_map(|n| n.name()).collect();
        assert_eq!(names, vec!["init", "shutdown"]);
        assert!(root.nodes().all(|n| n.kind == NodeKind::Function));
    }

    #[test]
    fn test_forward_declarations_create_no_nodes() {
        let (root, _) = parse_items("class A;\nenum class E : int;\nclass B {};").unwrap();
        let kinds: Vec<NodeKind> = root.nodes().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Class]);
    }

    #[test]
    fn test_nested_class_and_enum() {
        let (root, _) =
            parse_items("class Outer { class Inner { int v; }; enum Mode { A, B }; };").unwrap();
        let outer = root.find(NodeKind::Class, "Outer").unwrap();
        assert!(outer.find(NodeKind::Class, "Inner").is_some());
        assert!(outer.find(NodeKind::Enum, "Mode").is_some());
    }

    #[test]
    fn test_enum_class_with_initializer() {
        let (root, _) = parse_items("enum class Color { Red, Green = 5, Blue };").unwrap();
        let color = root.find(NodeKind::EnumClass, "Color").unwrap();
        let entries: Vec<&AstNode> = color.nodes_of(NodeKind::EnumDefinition).collect();
        assert_eq!(entries.len(), 3);

        let green = color.find(NodeKind::EnumDefinition, "Green").unwrap();
        let init = green.nodes_of(NodeKind::Init).next().unwrap();
        assert_eq!(init.text(), Some("5"));
        assert!(entries[0].nodes().next().is_none());
    }

    #[test]
    fn test_anonymous_enum_with_underlying_type() {
        let (root, _) = parse_items("enum : unsigned char { A = 1 << 2, B };").unwrap();
        let node = root.nodes().next().unwrap();
        assert_eq!(node.kind, NodeKind::Enum);
        assert_eq!(node.data, vec!["", "unsigned char"]);
        let a = node.find(NodeKind::EnumDefinition, "A").unwrap();
        assert_eq!(a.nodes().next().unwrap().text(), Some("1 << 2"));
    }

    #[test]
    fn test_enum_without_name_is_fatal() {
        let err = parse_items("enum ;").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ExpectedEnumName { .. }));
    }

    #[test]
    fn test_namespace_contains_items() {
        let (root, _) =
            parse_items("namespace a::b {\nclass C {};\nint f();\n}\nint g;").unwrap();
        let namespace = root.find(NodeKind::Namespace, "a::b").unwrap();
        assert!(namespace.find(NodeKind::Class, "C").is_some());
        assert!(namespace.find(NodeKind::Function, "f").is_some());
        assert!(root.find(NodeKind::Variable, "g").is_some());
    }

    #[test]
    fn test_using_namespace_is_not_a_namespace() {
        let (root, _) = parse_items("using namespace std;\nint x;").unwrap();
        assert!(root.nodes_of(NodeKind::Namespace).next().is_none());
        assert!(root.find(NodeKind::Variable, "x").is_some());
    }

    #[test]
    fn test_template_prefix_is_reported_and_skipped() {
        let (root, diagnostics) =
            parse_items("template <typename T, int N = 4>\nclass Buffer { T data[N]; };").unwrap();
        assert!(root.find(NodeKind::Class, "Buffer").is_some());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::IgnoredTemplate {
                line: 1,
                text: "typename T, int N = 4".to_string(),
            }]
        );
    }
}

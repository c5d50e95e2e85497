//! Declaration parsing implementation
//!
//! This module handles variable and function declarations, which share one
//! base type across a comma-separated list of declarators:
//!
//! ```text
//! declaration ::= base_type template_args? declarator ("," declarator)* ";"
//! declarator  ::= pointer* (qualified_name | operator_name) array_dim* tail
//! tail        ::= "(" arguments ")" finalizer       -- function
//!               | ("=" value | "(" value ")" | "{" value "}")?   -- variable
//! finalizer   ::= "const"? ("noexcept" ("(" opaque ")")? | "override" | "final")*
//!                 ("=" ("0" | "default" | "delete"))? (";" | "," | "{" body "}")
//! typedef     ::= "typedef" base_type template_args? declarator ("," declarator)* ";"
//! using       ::= "using" NAME "=" (type | opaque) ";"
//!               | "using" opaque ";"                 -- using-declaration, dropped
//! ```
//!
//! Every rule builds its nodes off to the side and links them into the
//! parent only once the whole declaration has matched.

use crate::parser::ast::*;
use crate::parser::combine::{capture_scope, combine_while_scope_aware};
use crate::parser::cursor::{Cursor, Filter};
use crate::parser::parse::{Diagnostic, ParseError, ParseErrorKind, ParseResult, Parser};
use crate::parser::token::{TokenIndex, TokenKind};

/// Name part of a declarator.
#[derive(Debug, Clone)]
pub(crate) struct Declarator {
    /// `::`-joined name, e.g. `Foo::Bar` or `operator`.
    pub name: String,
    /// Symbol of an operator declarator (`==`, `()`, `bool`).
    pub operator: Option<String>,
    pub line: usize,
}

/// How a function declarator was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclarationEnd {
    /// `;` or a body: the declaration is complete.
    Terminated,
    /// `,`: another declarator shares the return type.
    Continued,
}

impl<'src> Parser<'src> {
    /// Parse a variable or function declaration into `parent`.
    pub(crate) fn parse_declaration(
        &mut self,
        visibility: Visibility,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        let mut pos = *cursor;
        let Some(base) = self.parse_declaration_head(&mut pos)? else {
            return Ok(false);
        };

        let mut nodes = Vec::new();
        loop {
            let Some((declarator, ty)) = self.parse_declarator(&mut pos, &base)? else {
                return Ok(false);
            };

            if pos.is(TokenKind::LParen) {
                if let Some((function, end)) =
                    self.parse_function(visibility, &declarator, &ty, &mut pos)?
                {
                    nodes.push(function);
                    match end {
                        DeclarationEnd::Continued => continue,
                        DeclarationEnd::Terminated => break,
                    }
                }
                // an unparseable argument list is only an initializer for objects
                if declarator.operator.is_some() || ty.is_plain_void(self.source) {
                    return Ok(false);
                }
            }

            if ty.is_plain_void(self.source) {
                return Err(ParseError::new(
                    ParseErrorKind::VoidVariable {
                        name: declarator.name,
                    },
                    declarator.line,
                ));
            }

            let mut variable = Self::declarator_node(NodeKind::Variable, visibility, &declarator);
            let initialized = match self.parse_variable_initializer(&mut pos)? {
                Some(init) => {
                    variable.push_node(init);
                    true
                }
                None => false,
            };
            variable.set_type(ty);
            nodes.push(variable);

            if self.match_token(&mut pos, TokenKind::Comma) {
                continue;
            }
            if self.match_token(&mut pos, TokenKind::Semicolon) {
                break;
            }
            if initialized && pos.kind().is_closing_bracket() {
                self.report_truncated_initializer(&declarator, &pos);
            }
            return Ok(false);
        }

        *cursor = pos;
        for node in nodes {
            parent.push_node(node);
        }
        Ok(true)
    }

    /// `typedef` with one or more declarators, one TYPE_ALIAS per name.
    ///
    /// Forms the declarator grammar cannot name (function pointer typedefs,
    /// `typedef struct { ... } T;`) are consumed up to `;` without a node.
    pub(crate) fn parse_typedef(
        &mut self,
        visibility: Visibility,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Typedef) {
            return Ok(false);
        }
        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        if let Some(aliases) = self.parse_typedef_declarators(visibility, &mut pos)? {
            for alias in aliases {
                parent.push_node(alias);
            }
            *cursor = pos;
            return Ok(true);
        }

        let text = self.capture_value(&mut pos, |kind| kind == TokenKind::Semicolon)?;
        if !self.match_token(&mut pos, TokenKind::Semicolon) {
            return Ok(false);
        }
        tracing::debug!(target: "declscan::parser", line, "skipping typedef: {}", text);
        *cursor = pos;
        Ok(true)
    }

    fn parse_typedef_declarators(
        &self,
        visibility: Visibility,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<Vec<AstNode>>> {
        let mut pos = *cursor;
        let Some(base) = self.parse_declaration_head(&mut pos)? else {
            return Ok(None);
        };

        let mut aliases = Vec::new();
        loop {
            let Some((declarator, ty)) = self.parse_declarator(&mut pos, &base)? else {
                return Ok(None);
            };
            if declarator.operator.is_some() {
                return Ok(None);
            }
            let mut alias = Self::declarator_node(NodeKind::TypeAlias, visibility, &declarator);
            alias.set_type(ty);
            aliases.push(alias);

            if self.match_token(&mut pos, TokenKind::Comma) {
                continue;
            }
            if self.match_token(&mut pos, TokenKind::Semicolon) {
                break;
            }
            return Ok(None);
        }

        *cursor = pos;
        Ok(Some(aliases))
    }

    /// `using Name = target;` becomes a TYPE_ALIAS. The target is its TYPE
    /// when it reads as a type, otherwise an opaque INIT. Using-declarations
    /// and using-directives are consumed without a node.
    pub(crate) fn parse_using(
        &mut self,
        visibility: Visibility,
        cursor: &mut Cursor<'src>,
        parent: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::Using) {
            return Ok(false);
        }
        let mut pos = *cursor;
        let line = pos.line();
        pos.advance();

        if pos.is(TokenKind::Identifier) && pos.peek().kind == TokenKind::Equals {
            let mut alias = AstNode::new(NodeKind::TypeAlias, line)
                .with_data(visibility.as_str())
                .with_data(pos.text());
            pos.advance();
            pos.advance();

            let mut target = pos;
            match self.parse_type(&mut target)? {
                Some(ty) if target.is(TokenKind::Semicolon) => {
                    alias.set_type(ty);
                    pos = target;
                }
                _ => {
                    let value_line = pos.line();
                    let value = self.capture_value(&mut pos, |kind| kind == TokenKind::Semicolon)?;
                    alias.push_node(AstNode::new(NodeKind::Init, value_line).with_data(value));
                }
            }
            if !self.match_token(&mut pos, TokenKind::Semicolon) {
                return Ok(false);
            }
            parent.push_node(alias);
            *cursor = pos;
            return Ok(true);
        }

        let text = self.capture_value(&mut pos, |kind| kind == TokenKind::Semicolon)?;
        if !self.match_token(&mut pos, TokenKind::Semicolon) {
            return Ok(false);
        }
        tracing::debug!(target: "declscan::parser", line, "skipping using {}", text);
        *cursor = pos;
        Ok(true)
    }

    /// Shared base type of a declaration.
    ///
    /// Conversion and operator declarations (`explicit operator bool()`) have
    /// no base type name; only their leading modifiers are kept.
    fn parse_declaration_head(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<AstType>> {
        let mut lookahead = *cursor;
        let mut modifiers = Vec::new();
        self.parse_modifiers(&mut lookahead, &mut modifiers);
        if lookahead.is(TokenKind::Operator) {
            *cursor = lookahead;
            return Ok(Some(AstType {
                modifiers,
                ..AstType::default()
            }));
        }

        let mut pos = *cursor;
        let Some(mut base) = self.parse_base_type(&mut pos)? else {
            return Ok(None);
        };
        self.parse_template_suffix(&mut pos, &mut base)?;
        *cursor = pos;
        Ok(Some(base))
    }

    /// Pointers, name and array dimensions of one declarator.
    ///
    /// Returns the declarator together with `base` extended by its own
    /// pointer levels and dimensions.
    pub(crate) fn parse_declarator(
        &self,
        cursor: &mut Cursor<'src>,
        base: &AstType,
    ) -> ParseResult<Option<(Declarator, AstType)>> {
        let mut pos = *cursor;
        let mut ty = base.clone();
        self.parse_pointers_and_references(&mut pos, &mut ty)?;

        let line = pos.line();
        let mut segments: Vec<TokenIndex> = Vec::new();
        let mut is_operator = false;
        match pos.kind() {
            TokenKind::Identifier => {
                segments.push(pos.index());
                pos.advance();
                while pos.is(TokenKind::DoubleColon) {
                    pos.advance();
                    match pos.kind() {
                        TokenKind::Identifier => {}
                        TokenKind::Operator => is_operator = true,
                        _ => return Ok(None),
                    }
                    segments.push(pos.index());
                    pos.advance();
                    if is_operator {
                        break;
                    }
                }
            }
            TokenKind::Operator => {
                segments.push(pos.index());
                pos.advance();
                is_operator = true;
            }
            _ => return Ok(None),
        }

        let operator = if is_operator {
            match self.parse_operator_symbol(&mut pos)? {
                Some(symbol) => Some(symbol),
                None => return Ok(None),
            }
        } else {
            None
        };

        self.parse_array_dimensions(&mut pos, &mut ty)?;

        *cursor = pos;
        let declarator = Declarator {
            name: self.source.concat(&segments, "::"),
            operator,
            line,
        };
        Ok(Some((declarator, ty)))
    }

    /// The symbol after the `operator` keyword.
    ///
    /// `operator()` needs its empty pair; every other operator runs up to the
    /// `(` that opens its arguments.
    pub(crate) fn parse_operator_symbol(
        &self,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<String>> {
        let mut pos = *cursor;
        let mut tokens = Vec::new();

        if pos.is(TokenKind::LParen) {
            tokens.push(pos.index());
            pos.advance();
            if !pos.is(TokenKind::RParen) {
                return Ok(None);
            }
            tokens.push(pos.index());
            pos.advance();
        } else {
            loop {
                match pos.kind() {
                    TokenKind::LParen => break,
                    TokenKind::Semicolon => {
                        return Err(ParseError::at(ParseErrorKind::OperatorScanOverrun, &pos));
                    }
                    TokenKind::EndOfStream => return Ok(None),
                    _ => {
                        tokens.push(pos.index());
                        pos.advance();
                    }
                }
            }
        }

        *cursor = pos;
        Ok(Some(self.source.concat_words(&tokens)))
    }

    /// Arguments and finalizer of a function declarator.
    fn parse_function(
        &self,
        visibility: Visibility,
        declarator: &Declarator,
        ty: &AstType,
        cursor: &mut Cursor<'src>,
    ) -> ParseResult<Option<(AstNode, DeclarationEnd)>> {
        let mut pos = *cursor;
        let mut function = Self::declarator_node(NodeKind::Function, visibility, declarator);
        if !self.parse_function_arguments(&mut pos, &mut function)? {
            return Ok(None);
        }
        let Some(end) = self.parse_function_finalizer(&mut pos, &mut function)? else {
            return Ok(None);
        };

        function.set_type(ty.clone());
        *cursor = pos;
        Ok(Some((function, end)))
    }

    /// `( argument, ... )`, appending one ARGUMENT child per entry.
    pub(crate) fn parse_function_arguments(
        &self,
        cursor: &mut Cursor<'src>,
        node: &mut AstNode,
    ) -> ParseResult<bool> {
        if !cursor.is(TokenKind::LParen) {
            return Ok(false);
        }
        let mut pos = *cursor;
        pos.advance();

        let mut arguments = Vec::new();
        if !self.match_token(&mut pos, TokenKind::RParen) {
            loop {
                let Some(argument) = self.parse_argument(&mut pos)? else {
                    return Ok(false);
                };
                arguments.push(argument);

                if self.match_token(&mut pos, TokenKind::Comma) {
                    continue;
                }
                if self.match_token(&mut pos, TokenKind::RParen) {
                    break;
                }
                return Ok(false);
            }
        }

        for argument in arguments {
            node.push_node(argument);
        }
        *cursor = pos;
        Ok(true)
    }

    /// One argument: type, optional name, optional default value.
    pub(crate) fn parse_argument(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<AstNode>> {
        let mut pos = *cursor;
        let line = pos.line();

        if pos.is(TokenKind::Symbol) && pos.text() == "..." {
            pos.advance();
            let mut argument = AstNode::new(NodeKind::Argument, line).with_data("...");
            argument.set_type(AstType::default());
            *cursor = pos;
            return Ok(Some(argument));
        }

        let Some(mut ty) = self.parse_base_type(&mut pos)? else {
            return Ok(None);
        };
        self.parse_template_suffix(&mut pos, &mut ty)?;
        self.parse_pointers_and_references(&mut pos, &mut ty)?;

        let name = if pos.is(TokenKind::Identifier) {
            let name = pos.text();
            pos.advance();
            name
        } else {
            ""
        };
        self.parse_array_dimensions(&mut pos, &mut ty)?;

        let mut argument = AstNode::new(NodeKind::Argument, line).with_data(name);
        if self.match_token(&mut pos, TokenKind::Equals) {
            let value_line = pos.line();
            let value = self.capture_value(&mut pos, |kind| {
                matches!(kind, TokenKind::Comma | TokenKind::RParen)
            })?;
            argument.push_node(AstNode::new(NodeKind::Init, value_line).with_data(value));
        }
        argument.set_type(ty);

        *cursor = pos;
        Ok(Some(argument))
    }

    /// Qualifiers after the argument list and the way the declarator ends.
    ///
    /// Appends FUNCTION_PROPERTIES (when any property is set) and then
    /// DEFINITION (when a body follows).
    pub(crate) fn parse_function_finalizer(
        &self,
        cursor: &mut Cursor<'src>,
        node: &mut AstNode,
    ) -> ParseResult<Option<DeclarationEnd>> {
        let mut pos = *cursor;

        let is_const = self.match_token(&mut pos, TokenKind::Const);
        let mut is_noexcept = false;
        let mut is_override = false;
        let mut is_final = false;
        while pos.is(TokenKind::Identifier) {
            match pos.text() {
                "noexcept" => {
                    is_noexcept = true;
                    pos.advance();
                    // the condition is dropped
                    capture_scope(&mut pos, TokenKind::LParen, TokenKind::RParen, Filter::HideComments)?;
                    continue;
                }
                "override" => is_override = true,
                "final" => is_final = true,
                _ => break,
            }
            pos.advance();
        }

        let mut is_pure = false;
        let mut is_default = false;
        let mut is_delete = false;
        if pos.is(TokenKind::Equals) {
            pos.advance();
            match (pos.kind(), pos.text()) {
                (TokenKind::Number, "0") => is_pure = true,
                (TokenKind::Identifier, "default") => is_default = true,
                (TokenKind::Identifier, "delete") => is_delete = true,
                (_, found) => {
                    return Err(ParseError::at(
                        ParseErrorKind::InvalidPureVirtual {
                            found: found.to_string(),
                        },
                        &pos,
                    ));
                }
            }
            pos.advance();
        }

        let line = pos.line();
        let (end, body) = match pos.kind() {
            TokenKind::Semicolon => {
                pos.advance();
                (DeclarationEnd::Terminated, None)
            }
            TokenKind::Comma => {
                pos.advance();
                (DeclarationEnd::Continued, None)
            }
            TokenKind::LBrace if !(is_pure || is_default || is_delete) => {
                let span =
                    capture_scope(&mut pos, TokenKind::LBrace, TokenKind::RBrace, Filter::HideComments)?;
                (DeclarationEnd::Terminated, span)
            }
            _ => return Ok(None),
        };

        let properties: Vec<&str> = [
            (is_const, "const"),
            (is_noexcept, "noexcept"),
            (is_override, "override"),
            (is_final, "final"),
            (is_pure, "pure"),
            (is_default, "default"),
            (is_delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if !properties.is_empty() {
            let mut properties_node = AstNode::new(NodeKind::FunctionProperties, node.line);
            properties_node.data = properties.into_iter().map(str::to_string).collect();
            node.push_node(properties_node);
        }
        if let Some(span) = body {
            node.push_node(AstNode::new(NodeKind::Definition, line).with_data(self.source.span_text(&span)));
        }

        *cursor = pos;
        Ok(Some(end))
    }

    /// `= value`, `(value)` or `{value}` after a variable declarator.
    fn parse_variable_initializer(&self, cursor: &mut Cursor<'src>) -> ParseResult<Option<AstNode>> {
        let mut pos = *cursor;
        let line = pos.line();

        let value = match pos.kind() {
            TokenKind::Equals => {
                pos.advance();
                self.capture_value(&mut pos, |kind| {
                    matches!(kind, TokenKind::Comma | TokenKind::Semicolon)
                })?
            }
            TokenKind::LParen => {
                match capture_scope(&mut pos, TokenKind::LParen, TokenKind::RParen, Filter::HideComments)? {
                    Some(span) => self.source.span_text(&span),
                    None => return Ok(None),
                }
            }
            TokenKind::LBrace => {
                match capture_scope(&mut pos, TokenKind::LBrace, TokenKind::RBrace, Filter::HideComments)? {
                    // a body with statements is a definition, not a value
                    Some(span) if !self.has_top_level_semicolon(&span) => self.source.span_text(&span),
                    _ => return Ok(None),
                }
            }
            _ => return Ok(None),
        };

        *cursor = pos;
        Ok(Some(AstNode::new(NodeKind::Init, line).with_data(value)))
    }

    // ===== Helper methods =====

    /// Opaque value text up to the first top-level token `stop` accepts.
    pub(crate) fn capture_value<F>(&self, cursor: &mut Cursor<'src>, stop: F) -> ParseResult<String>
    where
        F: Fn(TokenKind) -> bool,
    {
        let text = combine_while_scope_aware(
            cursor,
            Filter::HideComments,
            self.options.scope_mode,
            |token| !stop(token.kind),
        )?;
        Ok(text.trim().to_string())
    }

    fn has_top_level_semicolon(&self, span: &[TokenIndex]) -> bool {
        let mut depth = 0usize;
        for &index in span {
            match self.source.kind(index) {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Semicolon if depth == 0 => return true,
                _ => {}
            }
        }
        false
    }

    fn report_truncated_initializer(&mut self, declarator: &Declarator, pos: &Cursor<'src>) {
        let closer = pos.text().to_string();
        tracing::warn!(
            target: "declscan::parser",
            line = declarator.line,
            "initializer of '{}' stops at unmatched '{}', declaration skipped",
            declarator.name,
            closer
        );
        self.diagnostics.push(Diagnostic::TruncatedInitializer {
            line: declarator.line,
            name: declarator.name.clone(),
            closer,
        });
    }

    fn declarator_node(kind: NodeKind, visibility: Visibility, declarator: &Declarator) -> AstNode {
        let mut node = AstNode::new(kind, declarator.line)
            .with_data(visibility.as_str())
            .with_data(declarator.name.as_str());
        if let Some(symbol) = &declarator.operator {
            node = node.with_data(symbol.as_str());
        }
        node
    }
}

// AST (Abstract Syntax Tree) definitions for the declaration parser

use super::token::{TokenIndex, TokenKind, TokenSource};
use std::fmt;

/// Kind tag of an [`AstNode`]; the meaning of a node's data fields is keyed
/// by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Namespace,
    Class,
    Enum,
    EnumClass,
    EnumDefinition,
    Init,
    Inherit,
    Variable,
    Function,
    Argument,
    Constructor,
    Destructor,
    ConstructorInitializer,
    FunctionProperties,
    Definition,
    TypeAlias,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "FILE",
            NodeKind::Namespace => "NAMESPACE",
            NodeKind::Class => "CLASS",
            NodeKind::Enum => "ENUM",
            NodeKind::EnumClass => "ENUM_CLASS",
            NodeKind::EnumDefinition => "ENUM_DEFINITION",
            NodeKind::Init => "INIT",
            NodeKind::Inherit => "INHERIT",
            NodeKind::Variable => "VARIABLE",
            NodeKind::Function => "FUNCTION",
            NodeKind::Argument => "ARGUMENT",
            NodeKind::Constructor => "CONSTRUCTOR",
            NodeKind::Destructor => "DESTRUCTOR",
            NodeKind::ConstructorInitializer => "CONSTRUCTOR_INITIALIZER",
            NodeKind::FunctionProperties => "FUNCTION_PROPERTIES",
            NodeKind::Definition => "DEFINITION",
            NodeKind::TypeAlias => "TYPE_ALIAS",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member and base-class access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Protected,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Protected => "protected",
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Private => Some(Visibility::Private),
            TokenKind::Public => Some(Visibility::Public),
            TokenKind::Protected => Some(Visibility::Protected),
            _ => None,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Pointer,
    Reference,
    RvalueReference,
}

impl PointerKind {
    pub fn symbol(self) -> &'static str {
        match self {
            PointerKind::Pointer => "*",
            PointerKind::Reference => "&",
            PointerKind::RvalueReference => "&&",
        }
    }
}

/// One `*`, `&` or `&&` level of a type, with the qualifiers that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerType {
    pub kind: PointerKind,
    pub modifiers: Vec<TokenIndex>,
}

/// Structural description of a type expression.
///
/// All parts are token indices into the unit's [`TokenSource`]. Spans
/// (template arguments, array dimensions) are kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AstType {
    pub name: Option<TokenIndex>,
    pub modifiers: Vec<TokenIndex>,
    pub namespaces: Vec<TokenIndex>,
    pub template_args: Option<Vec<TokenIndex>>,
    pub pointers: Vec<PointerType>,
    pub array_dimensions: Vec<Vec<TokenIndex>>,
}

impl AstType {
    /// Text of the type name, if any.
    pub fn name<'a>(&self, source: &'a TokenSource) -> Option<&'a str> {
        self.name.map(|index| source.text(index))
    }

    /// True for `void` without any pointer or reference level.
    pub fn is_plain_void(&self, source: &TokenSource) -> bool {
        self.pointers.is_empty()
            && self
                .name
                .is_some_and(|index| source.kind(index) == TokenKind::Void)
    }

    /// Render the type as source text, e.g. `const std::map<K, V> * const[4]`.
    pub fn render(&self, source: &TokenSource) -> String {
        let mut parts: Vec<String> = self
            .modifiers
            .iter()
            .map(|&index| source.text(index).to_string())
            .collect();

        if let Some(name) = self.name {
            let mut qualified = String::new();
            for &namespace in &self.namespaces {
                qualified.push_str(source.text(namespace));
                qualified.push_str("::");
            }
            qualified.push_str(source.text(name));
            if let Some(args) = &self.template_args {
                qualified.push('<');
                qualified.push_str(&source.span_text(args));
                qualified.push('>');
            }
            parts.push(qualified);
        }

        for pointer in &self.pointers {
            parts.push(pointer.kind.symbol().to_string());
            parts.extend(pointer.modifiers.iter().map(|&m| source.text(m).to_string()));
        }

        let mut rendered = parts.join(" ");
        for dimension in &self.array_dimensions {
            rendered.push('[');
            rendered.push_str(&source.span_text(dimension));
            rendered.push(']');
        }
        rendered
    }

    /// Resolve every token index to text, giving a value that can be
    /// compared across token sources.
    pub fn describe(&self, source: &TokenSource) -> TypeShape {
        let texts = |indices: &[TokenIndex]| -> Vec<String> {
            indices.iter().map(|&i| source.text(i).to_string()).collect()
        };

        TypeShape {
            name: self.name(source).map(str::to_string),
            modifiers: texts(&self.modifiers),
            namespaces: texts(&self.namespaces),
            template_args: self.template_args.as_deref().map(|span| source.span_text(span)),
            pointers: self
                .pointers
                .iter()
                .map(|p| (p.kind, texts(&p.modifiers)))
                .collect(),
            array_dimensions: self
                .array_dimensions
                .iter()
                .map(|span| source.span_text(span))
                .collect(),
        }
    }
}

/// Token-independent view of an [`AstType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeShape {
    pub name: Option<String>,
    pub modifiers: Vec<String>,
    pub namespaces: Vec<String>,
    pub template_args: Option<String>,
    pub pointers: Vec<(PointerKind, Vec<String>)>,
    pub array_dimensions: Vec<String>,
}

/// A child slot: either a nested node or the type of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstChild {
    Node(AstNode),
    Type(AstType),
}

/// Uniform tree node: a kind tag, ordered data fields and owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub data: Vec<String>,
    pub children: Vec<AstChild>,
    pub line: usize,
}

impl AstNode {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            data: Vec::new(),
            children: Vec::new(),
            line,
        }
    }

    pub fn with_data(mut self, field: impl Into<String>) -> Self {
        self.data.push(field.into());
        self
    }

    pub fn push_node(&mut self, node: AstNode) {
        self.children.push(AstChild::Node(node));
    }

    /// Put `ty` in the first child slot.
    pub fn set_type(&mut self, ty: AstType) {
        self.children.insert(0, AstChild::Type(ty));
    }

    pub fn data(&self, index: usize) -> Option<&str> {
        self.data.get(index).map(String::as_str)
    }

    /// The type in the first child slot, if there is one.
    pub fn ty(&self) -> Option<&AstType> {
        match self.children.first() {
            Some(AstChild::Type(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Child nodes, skipping the type slot.
    pub fn nodes(&self) -> impl Iterator<Item = &AstNode> {
        self.children.iter().filter_map(|child| match child {
            AstChild::Node(node) => Some(node),
            AstChild::Type(_) => None,
        })
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &AstNode> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    /// First child node of `kind` whose name is `name`.
    pub fn find(&self, kind: NodeKind, name: &str) -> Option<&AstNode> {
        self.nodes_of(kind).find(|node| node.name() == Some(name))
    }

    /// The declared name, located according to the node kind.
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            NodeKind::File
            | NodeKind::Namespace
            | NodeKind::Class
            | NodeKind::Enum
            | NodeKind::EnumClass
            | NodeKind::EnumDefinition
            | NodeKind::Argument
            | NodeKind::ConstructorInitializer => self.data(0),
            NodeKind::Inherit
            | NodeKind::Variable
            | NodeKind::Function
            | NodeKind::Constructor
            | NodeKind::Destructor
            | NodeKind::TypeAlias => self.data(1),
            NodeKind::Init | NodeKind::FunctionProperties | NodeKind::Definition => None,
        }
    }

    /// Access level for members and bases.
    pub fn visibility(&self) -> Option<Visibility> {
        match self.kind {
            NodeKind::Inherit
            | NodeKind::Variable
            | NodeKind::Function
            | NodeKind::Constructor
            | NodeKind::Destructor
            | NodeKind::TypeAlias => self.data(0).and_then(Visibility::parse),
            NodeKind::File
            | NodeKind::Namespace
            | NodeKind::Class
            | NodeKind::Enum
            | NodeKind::EnumClass
            | NodeKind::EnumDefinition
            | NodeKind::Init
            | NodeKind::Argument
            | NodeKind::ConstructorInitializer
            | NodeKind::FunctionProperties
            | NodeKind::Definition => None,
        }
    }

    /// Last segment of a `::`-qualified name (`Bar` for `Foo::Bar`).
    pub fn unqualified_name(&self) -> Option<&str> {
        self.name()
            .map(|name| name.rsplit("::").next().unwrap_or(name))
    }

    /// Leading segments of a `::`-qualified name (`["Foo"]` for `Foo::Bar`).
    pub fn qualifiers(&self) -> Vec<&str> {
        match self.name() {
            Some(name) => {
                let mut segments: Vec<&str> = name.split("::").collect();
                segments.pop();
                segments
            }
            None => Vec::new(),
        }
    }

    /// Operator symbol of an operator declarator (`==` for `operator==`).
    pub fn operator_symbol(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Function | NodeKind::Variable => self.data(2),
            _ => None,
        }
    }

    /// Text payload of INIT and DEFINITION nodes.
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Init | NodeKind::Definition => self.data(0),
            NodeKind::ConstructorInitializer => self.data(1),
            _ => None,
        }
    }

    /// Properties listed by a FUNCTION_PROPERTIES child (`const`, `pure`, ...).
    pub fn properties(&self) -> Vec<&str> {
        self.nodes_of(NodeKind::FunctionProperties)
            .flat_map(|node| node.data.iter().map(String::as_str))
            .collect()
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties().contains(&property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_helpers() {
        let node = AstNode::new(NodeKind::Function, 1)
            .with_data("public")
            .with_data("outer::Foo::Bar");
        assert_eq!(node.name(), Some("outer::Foo::Bar"));
        assert_eq!(node.unqualified_name(), Some("Bar"));
        assert_eq!(node.qualifiers(), vec!["outer", "Foo"]);
        assert_eq!(node.visibility(), Some(Visibility::Public));
    }

    #[test]
    fn test_type_slot_is_first_child() {
        let mut node = AstNode::new(NodeKind::Variable, 1)
            .with_data("private")
            .with_data("x");
        node.push_node(AstNode::new(NodeKind::Init, 1).with_data("5"));
        node.set_type(AstType::default());
        assert!(node.ty().is_some());
        assert_eq!(node.nodes().count(), 1);
    }

    #[test]
    fn test_render_type() {
        let source = TokenSource::from_text("const std :: string * const 4").unwrap();
        let index = |text: &str| {
            source
                .tokens()
                .iter()
                .position(|t| t.text == text)
                .unwrap()
        };
        let ty = AstType {
            name: Some(index("string")),
            modifiers: vec![index("const")],
            namespaces: vec![index("std")],
            template_args: None,
            pointers: vec![PointerType {
                kind: PointerKind::Pointer,
                modifiers: vec![index("const")],
            }],
            array_dimensions: vec![vec![index("4")]],
        };
        assert_eq!(ty.render(&source), "const std::string * const[4]");
    }
}

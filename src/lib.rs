//! # Introduction
//!
//! declscan extracts the declarations of C++-family headers into a uniform
//! tree: classes and their bases, enums, namespaces, variables, functions,
//! operators, constructors and destructors. Function bodies, initializers and
//! template argument lists are kept as opaque text, so the tree can drive code
//! generation or reflection without a full compiler front end.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → TokenSource → Parser → AstNode tree per file → ParseReport
//! ```
//!
//! 1. [`parser`]: tokenises text and runs the backtracking recursive descent
//!    grammar over a copyable [`parser::cursor::Cursor`].
//! 2. [`driver`]: reads files, parses them serially or in parallel and
//!    collects one FILE tree per input; also hosts the module registry used
//!    by the command line.
//!
//! ## Example
//!
//! ```
//! use declscan::driver::parse_unit;
//! use declscan::parser::ast::NodeKind;
//! use declscan::parser::ParserOptions;
//!
//! let unit = parse_unit("point.h", "class Point { public: int x, y; };", ParserOptions::default())
//!     .unwrap();
//! let point = unit.root.find(NodeKind::Class, "Point").unwrap();
//! assert_eq!(point.nodes_of(NodeKind::Variable).count(), 2);
//! ```

pub mod driver;
pub mod parser;

//! Declaration parser for C++-family sources
//!
//! This module transforms source text into a tree of declarations:
//! - [`lexer`]: Tokenization (source text → lexemes, trivia included)
//! - [`token`]: Token arena and [`token::TokenIndex`] references
//! - [`cursor`]: Copyable positions with visibility filters
//! - [`combine`]: Scope-aware text accumulation and bracketed span capture
//! - [`parse`]: The [`Parser`] coordinator, errors and diagnostics
//! - [`types`], [`declarations`], [`classes`]: Grammar rules
//! - [`ast`]: Node and type definitions
//! - [`dump`]: Text rendering of a tree
//!
//! # Supported Subset
//!
//! - Classes with base lists, access sections, nested classes and enums
//! - Enums and enum classes, optionally with an underlying type
//! - Variables and functions, including operators and shared base types
//! - Constructors, destructors and member initializer lists
//! - Namespaces
//!
//! Function bodies, initializers and template argument lists are kept as
//! opaque text. Preprocessor directives and `template <...>` prefixes are
//! skipped and reported.

pub mod ast;
pub mod classes;
pub mod combine;
pub mod cursor;
pub mod declarations;
pub mod dump;
pub mod lexer;
pub mod parse;
pub mod token;
pub mod types;

pub use parse::{Diagnostic, ParseError, ParseErrorKind, ParseResult, Parser, ParserOptions};

//! Per-file parsing and the module registry
//!
//! Each file is read, lexed and parsed independently. A fatal error only
//! fails its own file; the [`ParseReport`] lists the failure and every other
//! file still contributes its tree.
//!
//! Parallel runs share two things between workers: an atomic counter handing
//! out file indices and the result collection, appended once per file under
//! a `Mutex`. Results are returned in input order either way.

use crate::parser::ast::{AstNode, NodeKind};
use crate::parser::lexer::LexError;
use crate::parser::parse::{Diagnostic, ParseError, Parser, ParserOptions};
use crate::parser::token::TokenSource;
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use thiserror::Error;

/// A successfully parsed translation unit.
#[derive(Debug)]
pub struct ParsedUnit {
    pub label: String,
    /// Token arena that the tree's types index into.
    pub source: TokenSource,
    /// FILE node labelled with [`ParsedUnit::label`].
    pub root: AstNode,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl UnitError {
    /// Source line the error was reported at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            UnitError::Io { .. } => None,
            UnitError::Lex(err) => Some(err.line),
            UnitError::Parse(err) => Some(err.line),
        }
    }
}

/// Lex and parse one unit held in memory.
pub fn parse_unit(label: &str, text: &str, options: ParserOptions) -> Result<ParsedUnit, UnitError> {
    let source = TokenSource::from_text(text)?;
    let mut root = AstNode::new(NodeKind::File, 1).with_data(label);

    let mut parser = Parser::with_options(&source, options);
    parser.parse(&mut root)?;
    let diagnostics = parser.into_diagnostics();

    Ok(ParsedUnit {
        label: label.to_string(),
        source,
        root,
        diagnostics,
    })
}

/// Read and parse one file, labelling its root with the path.
pub fn parse_file(path: &Path, options: ParserOptions) -> Result<ParsedUnit, UnitError> {
    let text = fs::read_to_string(path).map_err(|source| UnitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_unit(&path.display().to_string(), &text, options)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Serial,
    Parallel,
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: UnitError,
}

/// Outcome of a multi-file run, in input order.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub units: Vec<ParsedUnit>,
    pub failures: Vec<FileFailure>,
}

impl ParseReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse every path, serially or on a pool of scoped worker threads.
pub fn parse_files(paths: &[PathBuf], mode: ExecutionMode, options: ParserOptions) -> ParseReport {
    let outcomes = match mode {
        ExecutionMode::Serial => paths
            .iter()
            .map(|path| parse_file(path, options))
            .collect(),
        ExecutionMode::Parallel => parse_parallel(paths, options),
    };

    let mut report = ParseReport::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        match outcome {
            Ok(unit) => {
                tracing::info!(
                    target: "declscan::driver",
                    file = %path.display(),
                    declarations = unit.root.nodes().count(),
                    diagnostics = unit.diagnostics.len(),
                    "parsed"
                );
                report.units.push(unit);
            }
            Err(error) => {
                tracing::warn!(target: "declscan::driver", file = %path.display(), "{}", error);
                report.failures.push(FileFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }
    report
}

fn parse_parallel(paths: &[PathBuf], options: ParserOptions) -> Vec<Result<ParsedUnit, UnitError>> {
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(paths.len())
        .max(1);
    tracing::debug!(target: "declscan::driver", workers, files = paths.len(), "starting parallel parse");

    let next = AtomicUsize::new(0);
    let results = Mutex::new(Vec::with_capacity(paths.len()));

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(path) = paths.get(index) else {
                    break;
                };
                let outcome = parse_file(path, options);
                results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((index, outcome));
            });
        }
    });

    let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, outcome)| outcome).collect()
}

// ===== Module registry =====

/// A named way of processing a set of files.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self, paths: &[PathBuf], options: ParserOptions) -> ParseReport;
}

pub type ModuleFactory = fn() -> Box<dyn Module>;

/// The declaration parser as a module.
#[derive(Debug, Clone, Copy)]
pub struct CppParserModule {
    mode: ExecutionMode,
}

impl CppParserModule {
    pub fn serial() -> Self {
        Self {
            mode: ExecutionMode::Serial,
        }
    }

    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
        }
    }
}

impl Module for CppParserModule {
    fn name(&self) -> &'static str {
        match self.mode {
            ExecutionMode::Serial => "cpp_parser",
            ExecutionMode::Parallel => "cpp_parser_mt",
        }
    }

    fn description(&self) -> &'static str {
        match self.mode {
            ExecutionMode::Serial => "parse declarations one file at a time",
            ExecutionMode::Parallel => "parse declarations on all available cores",
        }
    }

    fn run(&self, paths: &[PathBuf], options: ParserOptions) -> ParseReport {
        parse_files(paths, self.mode, options)
    }
}

fn cpp_parser() -> Box<dyn Module> {
    Box::new(CppParserModule::serial())
}

fn cpp_parser_mt() -> Box<dyn Module> {
    Box::new(CppParserModule::parallel())
}

/// Ordered name → factory table.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<(&'static str, ModuleFactory)>,
    index: FxHashMap<&'static str, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `cpp_parser` and `cpp_parser_mt`.
    pub fn with_builtin_modules() -> Self {
        let mut registry = Self::new();
        registry.register("cpp_parser", cpp_parser);
        registry.register("cpp_parser_mt", cpp_parser_mt);
        registry
    }

    /// Add a module. A name that is already registered keeps its position
    /// and gets the new factory.
    pub fn register(&mut self, name: &'static str, factory: ModuleFactory) {
        match self.index.get(name) {
            Some(&slot) => self.entries[slot].1 = factory,
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push((name, factory));
            }
        }
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Module>> {
        let &slot = self.index.get(name)?;
        let (_, factory) = self.entries[slot];
        Some(factory())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::ParseErrorKind;

    struct Noop;

    impl Module for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn description(&self) -> &'static str {
            "does nothing"
        }

        fn run(&self, _paths: &[PathBuf], _options: ParserOptions) -> ParseReport {
            ParseReport::default()
        }
    }

    fn noop() -> Box<dyn Module> {
        Box::new(Noop)
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("declscan-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_unit_labels_root() {
        let unit = parse_unit("shapes.h", "class Shape {};", ParserOptions::default()).unwrap();
        assert_eq!(unit.root.kind, NodeKind::File);
        assert_eq!(unit.root.name(), Some("shapes.h"));
        assert_eq!(unit.root.nodes().count(), 1);
    }

    #[test]
    fn test_parse_unit_reports_fatal_line() {
        let err = parse_unit("bad.h", "class A {\n int x;\n", ParserOptions::default()).unwrap_err();
        match err {
            UnitError::Parse(ref parse) => {
                assert!(matches!(parse.kind, ParseErrorKind::UnterminatedScope { .. }));
            }
            _ => panic!("Expected parse error"),
        }
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_lex_error_fails_unit() {
        let err = parse_unit("bad.h", "/* never closed", ParserOptions::default()).unwrap_err();
        assert!(matches!(err, UnitError::Lex(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("declscan-definitely-missing.h");
        let err = parse_file(&path, ParserOptions::default()).unwrap_err();
        assert!(matches!(err, UnitError::Io { .. }));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_parallel_matches_serial_order() {
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| {
                let body = if i == 3 {
                    "class Broken {".to_string()
                } else {
                    format!("class C{i} {{ int v{i}; }};")
                };
                write_temp(&format!("order{i}.h"), &body)
            })
            .collect();

        let serial = parse_files(&paths, ExecutionMode::Serial, ParserOptions::default());
        let parallel = parse_files(&paths, ExecutionMode::Parallel, ParserOptions::default());

        for report in [&serial, &parallel] {
            assert_eq!(report.units.len(), 5);
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].path, paths[3]);
            let classes: Vec<&str> = report
                .units
                .iter()
                .filter_map(|unit| unit.root.nodes().next().and_then(|n| n.name()))
                .collect();
            assert_eq!(classes, vec!["C0", "C1", "C2", "C4", "C5"]);
        }

        for path in paths {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn test_builtin_modules_in_order() {
        let registry = ModuleRegistry::with_builtin_modules();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["cpp_parser", "cpp_parser_mt"]);
        assert_eq!(registry.create("cpp_parser_mt").unwrap().name(), "cpp_parser_mt");
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = ModuleRegistry::with_builtin_modules();
        registry.register("cpp_parser", noop);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().next(), Some("cpp_parser"));
        assert_eq!(registry.create("cpp_parser").unwrap().name(), "noop");
    }
}

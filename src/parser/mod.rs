//! Parser module for reqgen.
//!
//! Wraps tree-sitter's Python grammar. Tree-sitter is error tolerant and
//! accepts Python 2 constructs, so every file is also checked against a
//! strict Python 3 grammar (`rustpython-parser`). A file that fails either
//! check is reported as an error to the caller, which treats it as
//! contributing no imports; one malformed file never stops the rest of a scan.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use reqgen::parser::SourceParser;
//!
//! let mut parser = SourceParser::new()?;
//! let tree = parser.parse_file(Path::new("app/main.py"))?;
//! println!("{}", tree.root_node().kind()); // "module"
//! ```

pub mod types;

use std::fs;
use std::path::Path;

use rustpython_parser::{ast, Parse};
use thiserror::Error;
use tracing::trace;
use tree_sitter::{Node, Parser, Tree};

pub use types::{top_level_name, DependencySet, ModuleName, ResolvedDependency};

/// File extension recognized as Python source.
pub const SOURCE_EXTENSION: &str = "py";

/// Errors that can occur while parsing a source file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },

    #[error("Syntax error in {path} at line {line}: {message}")]
    Invalid {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns true if the path has the Python source extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Python source parser backed by tree-sitter.
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    /// Create a parser configured for Python.
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| ParseError::LanguageInit)?;
        Ok(Self { parser })
    }

    /// Read and parse a file.
    pub fn parse_file(&mut self, path: &Path) -> ParseResult<Tree> {
        let content = fs::read_to_string(path)?;
        self.parse_source(&content, path)
    }

    /// Parse source text. `path` is only used for error reporting.
    ///
    /// Tree-sitter recovers from syntax errors by inserting `ERROR` and
    /// missing nodes; any such node makes the whole file a syntax error. A
    /// tree without error nodes must still pass [`check_syntax`].
    pub fn parse_source(&mut self, source: &str, path: &Path) -> ParseResult<Tree> {
        // With a language set and no timeout, `parse` only returns None if
        // the language was rejected.
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParseError::LanguageInit)?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root).map_or(1, |n| n.start_position().row + 1);
            trace!(path = %path.display(), line, "syntax error");
            return Err(ParseError::Syntax {
                path: path.display().to_string(),
                line,
            });
        }

        check_syntax(source, path)?;
        Ok(tree)
    }
}

/// Validate `source` against the Python 3 grammar.
///
/// Rejects what tree-sitter lets through: `print 'x'`, `except E, e:`,
/// backticks, `<>`, octal literals like `0777`, unexpected indentation.
pub fn check_syntax(source: &str, path: &Path) -> ParseResult<()> {
    let path_str = path.display().to_string();
    match ast::Suite::parse(source, &path_str) {
        Ok(_) => Ok(()),
        Err(e) => {
            let offset = usize::from(e.offset);
            let line = line_at(source, offset);
            trace!(path = %path_str, line, error = %e.error, "rejected by strict parser");
            Err(ParseError::Invalid {
                path: path_str,
                line,
                message: e.error.to_string(),
            })
        }
    }
}

/// 1-indexed line containing byte `offset`.
fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Find the first error or missing node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

//! Import collection over tree-sitter Python syntax trees.
//!
//! This module walks a parsed module and records every absolute import it
//! finds, wherever it appears (top level, inside functions, under `try`).

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::{Node, Tree, TreeCursor};

use crate::parser::{top_level_name, ModuleName, ParseError, SourceParser};

/// Errors that can occur during import analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Project directory does not exist: {0}")]
    MissingRoot(String),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(String),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The kind of import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b` or `import a.b as c`
    Import,
    /// `from a.b import c`
    From,
    /// `from __future__ import annotations`
    Future,
}

/// An absolute import found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The full dotted module path, e.g. `google.protobuf`.
    pub module: String,
    /// The kind of statement it came from.
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl Import {
    /// The first dot-segment of the module path.
    pub fn top_level(&self) -> &str {
        top_level_name(&self.module)
    }
}

/// Syntax node kinds the collector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Import,
    ImportFrom,
    FutureImport,
    Other,
}

impl NodeKind {
    fn of(node: &Node<'_>) -> Self {
        match node.kind() {
            "import_statement" => NodeKind::Import,
            "import_from_statement" => NodeKind::ImportFrom,
            "future_import_statement" => NodeKind::FutureImport,
            _ => NodeKind::Other,
        }
    }
}

/// Collect every absolute import in a parsed tree.
///
/// Relative imports (`from . import x`, `from ..pkg import y`) refer to code
/// inside the project and are skipped.
pub fn collect_imports(tree: &Tree, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = tree.root_node().walk();
    visit_node(&mut cursor, source, &mut imports);
    imports
}

/// Reduce imports to the set of distinct top-level module names.
pub fn imported_modules(imports: &[Import]) -> BTreeSet<ModuleName> {
    imports
        .iter()
        .map(|import| import.top_level().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn visit_node(cursor: &mut TreeCursor<'_>, source: &str, imports: &mut Vec<Import>) {
    let node = cursor.node();

    match NodeKind::of(&node) {
        NodeKind::Import => collect_import_statement(&node, source, imports),
        NodeKind::ImportFrom => {
            if let Some(import) = parse_from_import(&node, source) {
                imports.push(import);
            }
        }
        NodeKind::FutureImport => imports.push(Import {
            module: "__future__".to_string(),
            kind: ImportKind::Future,
            line: node.start_position().row + 1,
        }),
        NodeKind::Other => {}
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, imports);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// `import a.b, c as d` records `a.b` and `c`.
fn collect_import_statement(node: &Node<'_>, source: &str, imports: &mut Vec<Import>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();

    for name in node.children_by_field_name("name", &mut cursor) {
        let dotted = match name.kind() {
            "dotted_name" => Some(name),
            "aliased_import" => name.child_by_field_name("name"),
            _ => None,
        };

        if let Some(module) = dotted.and_then(|d| dotted_text(&d, source)) {
            imports.push(Import {
                module,
                kind: ImportKind::Import,
                line,
            });
        }
    }
}

/// `from a.b import c` records `a.b`. Relative module paths yield nothing.
fn parse_from_import(node: &Node<'_>, source: &str) -> Option<Import> {
    let module_node = node.child_by_field_name("module_name")?;
    if module_node.kind() != "dotted_name" {
        return None;
    }

    Some(Import {
        module: dotted_text(&module_node, source)?,
        kind: ImportKind::From,
        line: node.start_position().row + 1,
    })
}

/// Join the identifiers of a `dotted_name`, dropping any whitespace or
/// comments between segments.
fn dotted_text(node: &Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let segments: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .filter_map(|child| source.get(child.start_byte()..child.end_byte()))
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("."))
    }
}

/// Analyzer for extracting imports from Python source files.
pub struct ImportAnalyzer {
    parser: SourceParser,
}

impl ImportAnalyzer {
    /// Create a new ImportAnalyzer.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            parser: SourceParser::new()?,
        })
    }

    /// Analyze a single file and extract all imports.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<Vec<Import>> {
        let source = std::fs::read_to_string(path).map_err(ParseError::from)?;
        self.analyze_source(&source, path)
    }

    /// Analyze source code directly.
    pub fn analyze_source(&mut self, source: &str, path: &Path) -> AnalysisResult<Vec<Import>> {
        let tree = self.parser.parse_source(source, path)?;
        Ok(collect_imports(&tree, source))
    }

    /// Top-level module names imported by a file.
    ///
    /// Never fails: unreadable or syntactically invalid files contribute no
    /// imports, and the problem is logged.
    pub fn modules_in_file(&mut self, path: &Path) -> BTreeSet<ModuleName> {
        match self.analyze_file(path) {
            Ok(imports) => {
                debug!(path = %path.display(), count = imports.len(), "collected imports");
                imported_modules(&imports)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                BTreeSet::new()
            }
        }
    }
}

/// Top-level module names imported by a single file; empty on any error.
pub fn analyze_file(path: &Path) -> AnalysisResult<BTreeSet<ModuleName>> {
    let mut analyzer = ImportAnalyzer::new()?;
    Ok(analyzer.modules_in_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse_source(source: &str) -> Vec<Import> {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        analyzer
            .analyze_source(source, Path::new("test.py"))
            .unwrap()
    }

    fn modules(source: &str) -> Vec<String> {
        imported_modules(&parse_source(source)).into_iter().collect()
    }

    // ===== Absolute Import Tests =====

    #[test]
    fn test_simple_import() {
        let imports = parse_source("import requests\n");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "requests");
        assert_eq!(imports[0].kind, ImportKind::Import);
        assert_eq!(imports[0].line, 1);
    }

    #[test]
    fn test_dotted_import_keeps_full_path() {
        let imports = parse_source("import google.protobuf.message\n");

        assert_eq!(imports[0].module, "google.protobuf.message");
        assert_eq!(imports[0].top_level(), "google");
    }

    #[test]
    fn test_multiple_names_in_one_statement() {
        assert_eq!(modules("import os, sys, numpy.linalg\n"), vec!["numpy", "os", "sys"]);
    }

    #[test]
    fn test_aliased_import() {
        let imports = parse_source("import numpy as np, pandas.api as pdapi\n");

        let names: Vec<_> = imports.iter().map(|i| i.module.as_str()).collect();
        assert_eq!(names, vec!["numpy", "pandas.api"]);
    }

    // ===== From Import Tests =====

    #[test]
    fn test_from_import() {
        let imports = parse_source("from flask import Flask, request\n");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "flask");
        assert_eq!(imports[0].kind, ImportKind::From);
    }

    #[test]
    fn test_from_import_dotted_module() {
        assert_eq!(modules("from sqlalchemy.orm import Session\n"), vec!["sqlalchemy"]);
    }

    #[test]
    fn test_from_import_parenthesized() {
        let source = "from django.db.models import (\n    Model,\n    CharField,\n)\n";
        assert_eq!(modules(source), vec!["django"]);
    }

    #[test]
    fn test_from_import_wildcard() {
        assert_eq!(modules("from tkinter import *\n"), vec!["tkinter"]);
    }

    #[test]
    fn test_future_import() {
        let imports = parse_source("from __future__ import annotations\n");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "__future__");
        assert_eq!(imports[0].kind, ImportKind::Future);
    }

    // ===== Relative Import Tests =====

    #[rstest]
    #[case("from . import views\n")]
    #[case("from .models import User\n")]
    #[case("from ..core.utils import helper\n")]
    #[case("from .. import config\n")]
    fn test_relative_imports_are_skipped(#[case] source: &str) {
        assert!(parse_source(source).is_empty());
    }

    #[test]
    fn test_relative_and_absolute_mixed() {
        let source = "from . import views\nfrom .models import User\nimport celery\n";
        assert_eq!(modules(source), vec!["celery"]);
    }

    // ===== Traversal Tests =====

    #[test]
    fn test_nested_imports_are_found() {
        let source = r#"
def load():
    import yaml
    return yaml

class Loader:
    def run(self):
        from toml import loads
        return loads

try:
    import ujson as json
except ImportError:
    import json
"#;
        assert_eq!(modules(source), vec!["json", "toml", "ujson", "yaml"]);
    }

    #[test]
    fn test_import_lines() {
        let source = "import os\n\n\nfrom attrs import define\n";
        let imports = parse_source(source);

        assert_eq!(imports[0].line, 1);
        assert_eq!(imports[1].line, 4);
    }

    #[test]
    fn test_duplicates_collapse() {
        let source = "import requests\nimport requests.adapters\nfrom requests import get\n";
        assert_eq!(modules(source), vec!["requests"]);
    }

    #[test]
    fn test_dynamic_import_is_ignored() {
        let source = "mod = __import__('pkg_dynamic')\nimport importlib\n";
        assert_eq!(modules(source), vec!["importlib"]);
    }

    #[test]
    fn test_imports_in_strings_and_comments_are_ignored() {
        let source = "# import fake_comment\ntext = 'import fake_string'\n";
        assert!(parse_source(source).is_empty());
    }

    // ===== Error Handling Tests =====

    #[test]
    fn test_syntax_error_is_an_error() {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        let result = analyzer.analyze_source("import requests\nif True\n", Path::new("bad.py"));
        assert!(matches!(result, Err(AnalysisError::Parse(ParseError::Syntax { .. }))));
    }

    #[test]
    fn test_modules_in_file_with_syntax_error_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.py");
        std::fs::write(&path, "import requests\ndef broken(:\n").unwrap();

        let mut analyzer = ImportAnalyzer::new().unwrap();
        assert!(analyzer.modules_in_file(&path).is_empty());
    }

    #[test]
    fn test_modules_in_missing_file_is_empty() {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        assert!(analyzer
            .modules_in_file(Path::new("/no/such/dir/missing.py"))
            .is_empty());
    }

    #[test]
    fn test_analyze_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.py");
        std::fs::write(&path, "import click\nfrom rich.console import Console\n").unwrap();

        let names: Vec<_> = analyze_file(&path).unwrap().into_iter().collect();
        assert_eq!(names, vec!["click", "rich"]);
    }
}

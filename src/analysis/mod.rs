//! Source code analysis module for reqgen.
//!
//! This module finds the third-party modules a Python project imports.
//!
//! # Features
//!
//! - Collect `import a.b` and `from a.b import c` statements anywhere in a file
//! - Skip relative imports, which point back into the project
//! - Tolerate files that fail to parse
//! - Filter out standard-library modules
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use reqgen::analysis::{scan_project, ScanOptions};
//! use reqgen::stdlib::StandardLibrary;
//!
//! let stdlib = StandardLibrary::detect("python3");
//! let outcome = scan_project(Path::new("./src"), &stdlib, ScanOptions::default())?;
//! for name in &outcome.dependencies {
//!     println!("{}", name);
//! }
//! ```

pub mod imports;
pub mod scanner;

// Re-export main types for convenience
pub use imports::{
    analyze_file, collect_imports, imported_modules, AnalysisError, AnalysisResult, Import,
    ImportAnalyzer, ImportKind,
};
pub use scanner::{
    scan_project, ProjectScanner, ScanOptions, ScanOutcome, ScanReport, DEFAULT_EXCLUDED_DIRS,
};

//! Project-wide dependency discovery.
//!
//! Walks a project directory, collects the imports of every Python file and
//! subtracts the standard library, leaving the third-party dependency set.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::imports::{AnalysisError, AnalysisResult, ImportAnalyzer};
use crate::parser::{is_source_file, DependencySet};
use crate::stdlib::StandardLibrary;

/// Directory names skipped during traversal unless overridden.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    "site-packages",
    "node_modules",
];

/// Traversal settings for a project scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Follow symbolic links. Off by default so link cycles cannot occur;
    /// when on, walkdir reports loops as entry errors, which are skipped.
    pub follow_links: bool,
    /// Maximum directory depth below the root, unbounded when `None`.
    pub max_depth: Option<usize>,
    /// Directory names never descended into.
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    /// Options that descend into every directory.
    pub fn unfiltered() -> Self {
        Self {
            excluded_dirs: Vec::new(),
            ..Self::default()
        }
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        // The root itself is always scanned, whatever its name.
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.excluded_dirs.iter().any(|excluded| *excluded == name)
    }
}

/// Counters gathered while scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Source files visited.
    pub files_scanned: usize,
    /// Source files that contributed nothing because they could not be read
    /// or parsed.
    pub files_skipped: usize,
    /// Directory entries walkdir could not read.
    pub walk_errors: usize,
    /// Distinct top-level names seen before filtering.
    pub modules_seen: usize,
    /// Names removed because they belong to the standard library.
    pub stdlib_filtered: usize,
}

/// Result of scanning a project.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Third-party dependency names.
    pub dependencies: DependencySet,
    /// Traversal statistics.
    pub report: ScanReport,
}

/// Scans project directories for third-party imports.
pub struct ProjectScanner {
    analyzer: ImportAnalyzer,
    options: ScanOptions,
}

impl ProjectScanner {
    /// Create a scanner with the given traversal options.
    pub fn new(options: ScanOptions) -> AnalysisResult<Self> {
        Ok(Self {
            analyzer: ImportAnalyzer::new()?,
            options,
        })
    }

    /// Scan `root` recursively and return every imported module that is not
    /// part of `stdlib`.
    pub fn scan(&mut self, root: &Path, stdlib: &StandardLibrary) -> AnalysisResult<ScanOutcome> {
        if !root.exists() {
            return Err(AnalysisError::MissingRoot(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(AnalysisError::NotADirectory(root.display().to_string()));
        }

        let mut report = ScanReport::default();
        let mut dependencies = DependencySet::new();

        let mut walker = WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        let options = &self.options;
        for entry in walker.into_iter().filter_entry(|e| !options.is_excluded(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    report.walk_errors += 1;
                    continue;
                }
            };

            // `Path::is_file` follows links, so a symlinked module is read
            // even when directory links are not descended into.
            if !is_source_file(entry.path()) || !entry.path().is_file() {
                continue;
            }

            report.files_scanned += 1;
            match self.analyzer.analyze_file(entry.path()) {
                Ok(imports) => {
                    debug!(path = %entry.path().display(), count = imports.len(), "collected imports");
                    dependencies.extend(imports.iter().map(|i| i.top_level().to_string()));
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "skipping file");
                    report.files_skipped += 1;
                }
            }
        }

        report.modules_seen = dependencies.len();
        report.stdlib_filtered = dependencies.retain(|name| !name.is_empty() && !stdlib.contains(name));

        info!(
            root = %root.display(),
            files = report.files_scanned,
            skipped = report.files_skipped,
            dependencies = dependencies.len(),
            "scan complete"
        );

        Ok(ScanOutcome {
            dependencies,
            report,
        })
    }
}

/// Scan a project with the given options.
pub fn scan_project(
    root: &Path,
    stdlib: &StandardLibrary,
    options: ScanOptions,
) -> AnalysisResult<ScanOutcome> {
    ProjectScanner::new(options)?.scan(root, stdlib)
}

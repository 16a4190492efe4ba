use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::ScanOptions;
use crate::manifest::ManifestFormat;
use crate::registry::{DEFAULT_PYPI_REGISTRY, DEFAULT_TIMEOUT_SECS};
use crate::stdlib::DEFAULT_PYTHON;

// =============================================================================
// Defaults
// =============================================================================

/// Log filter used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable naming the Python interpreter.
pub const PYTHON_ENV: &str = "REQGEN_PYTHON";

/// Environment variable overriding the registry base URL.
pub const REGISTRY_URL_ENV: &str = "REQGEN_REGISTRY_URL";

/// Registry settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Base URL; packages are fetched from `{url}/pypi/{name}/json`.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// When false no requests are made and every dependency is unpinned.
    pub enabled: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PYPI_REGISTRY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            enabled: true,
        }
    }
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project directory to scan.
    pub root: PathBuf,
    /// Manifest format.
    pub format: ManifestFormat,
    /// Explicit output path; the format's default file name otherwise.
    pub output: Option<PathBuf>,
    /// Interpreter asked for its standard-library module list.
    pub python: String,
    pub registry: RegistryConfig,
    pub scan: ScanOptions,
    /// Print the manifest instead of writing it.
    pub dry_run: bool,
}

impl Config {
    /// Config with defaults for everything but the project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: ManifestFormat::default(),
            output: None,
            python: DEFAULT_PYTHON.to_string(),
            registry: RegistryConfig::default(),
            scan: ScanOptions::default(),
            dry_run: false,
        }
    }

    /// Where the manifest goes. Defaults to the format's file name in the
    /// current directory.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| Path::new(self.format.default_file_name()).to_path_buf())
    }
}

//! Standard-library classification.
//!
//! The set of modules shipped with the Python runtime is asked of the
//! interpreter itself rather than hard-coded, so it tracks whichever Python
//! version the project is developed against. It is built once at startup and
//! passed by reference into the scanner.

use std::collections::HashSet;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, warn};

/// Interpreter used when none is configured.
pub const DEFAULT_PYTHON: &str = "python3";

/// Prints one standard module name per line. Interpreters older than 3.10
/// lack `sys.stdlib_module_names`, so the stdlib directory is listed instead.
const LIST_MODULES_SCRIPT: &str = r#"
import sys
names = set(sys.builtin_module_names)
try:
    names.update(sys.stdlib_module_names)
except AttributeError:
    import os, pkgutil, sysconfig
    stdlib = sysconfig.get_paths()["stdlib"]
    paths = [stdlib, os.path.join(stdlib, "lib-dynload")]
    names.update(m.name for m in pkgutil.iter_modules(paths))
print("\n".join(sorted(names)))
"#;

/// Errors that can occur while enumerating the standard library.
#[derive(Error, Debug)]
pub enum StdlibError {
    #[error("Failed to run interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interpreter '{interpreter}' exited with {status}: {stderr}")]
    Failed {
        interpreter: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Interpreter '{0}' listed no modules")]
    Empty(String),
}

/// Read-only set of standard-library module names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardLibrary {
    names: HashSet<String>,
}

impl StandardLibrary {
    /// An empty set. Filtering against it removes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fixed set, e.g. for tests.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Ask `interpreter` for its standard module index.
    ///
    /// Never fails: if the interpreter is missing or misbehaves, a warning is
    /// logged and the empty set is returned, so third-party detection
    /// over-reports instead of aborting.
    pub fn detect(interpreter: &str) -> Self {
        match Self::try_detect(interpreter) {
            Ok(stdlib) => {
                debug!(interpreter, modules = stdlib.len(), "standard library detected");
                stdlib
            }
            Err(e) => {
                warn!(error = %e, "could not enumerate the standard library; no imports will be filtered");
                Self::empty()
            }
        }
    }

    /// Like [`StandardLibrary::detect`], but reports why enumeration failed.
    pub fn try_detect(interpreter: &str) -> Result<Self, StdlibError> {
        let output = Command::new(interpreter)
            .args(["-I", "-c", LIST_MODULES_SCRIPT])
            .output()
            .map_err(|source| StdlibError::Spawn {
                interpreter: interpreter.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(StdlibError::Failed {
                interpreter: interpreter.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdlib = Self::parse_listing(&String::from_utf8_lossy(&output.stdout));
        if stdlib.is_empty() {
            return Err(StdlibError::Empty(interpreter.to_string()));
        }
        Ok(stdlib)
    }

    /// Parse newline-separated module names, ignoring blank lines.
    pub fn parse_listing(listing: &str) -> Self {
        Self::from_names(
            listing
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

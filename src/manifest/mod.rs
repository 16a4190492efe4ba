//! Manifest generation.
//!
//! This module resolves each dependency against a [`VersionSource`] and
//! writes the result in one of three formats: a pinned requirements list,
//! a Pipfile, or a poetry-style pyproject.

pub mod pipfile;
pub mod pyproject;
pub mod requirements;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::parser::{DependencySet, ResolvedDependency};
use crate::registry::{resolve_version, VersionSource};

/// Value written for a dependency whose version is unknown, in the
/// TOML-based formats.
pub const WILDCARD: &str = "*";

/// Errors that can occur while generating a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to write manifest: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    /// `requirements.txt` - one `name==version` per line
    #[default]
    Requirements,
    /// `Pipfile` - `[packages]` section
    Pipfile,
    /// `pyproject.toml` - `[tool.poetry.dependencies]` table
    Pyproject,
}

impl ManifestFormat {
    /// File name used when no output path is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ManifestFormat::Requirements => "requirements.txt",
            ManifestFormat::Pipfile => "Pipfile",
            ManifestFormat::Pyproject => "pyproject.toml",
        }
    }
}

impl std::str::FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requirements" | "txt" => Ok(ManifestFormat::Requirements),
            "pipfile" => Ok(ManifestFormat::Pipfile),
            "pyproject" | "poetry" => Ok(ManifestFormat::Pyproject),
            _ => Err(format!(
                "Unknown manifest format: '{}'. Valid formats: requirements, pipfile, pyproject",
                s
            )),
        }
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestFormat::Requirements => write!(f, "requirements"),
            ManifestFormat::Pipfile => write!(f, "pipfile"),
            ManifestFormat::Pyproject => write!(f, "pyproject"),
        }
    }
}

/// Project details some formats embed alongside the dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project name, usually the scanned directory's name.
    pub name: String,
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Derive the project name from a directory path.
    pub fn from_root(root: &Path) -> Self {
        let name = root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| root.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        Self { name }
    }
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self::new("project")
    }
}

/// Trait for manifest writers.
pub trait ManifestWriter {
    /// Write the dependencies to the given writer.
    fn write<W: Write>(&self, deps: &[ResolvedDependency], writer: &mut W) -> ManifestResult<()>;
}

/// Resolve every dependency, one registry call per name, in set order.
pub fn resolve_all(deps: &DependencySet, source: &dyn VersionSource) -> Vec<ResolvedDependency> {
    deps.iter()
        .map(|name| ResolvedDependency::new(name.clone(), resolve_version(source, name)))
        .collect()
}

/// Render resolved dependencies in the given format.
pub fn render<W: Write>(
    format: ManifestFormat,
    deps: &[ResolvedDependency],
    project: &ProjectInfo,
    writer: &mut W,
) -> ManifestResult<()> {
    match format {
        ManifestFormat::Requirements => requirements::RequirementsWriter.write(deps, writer),
        ManifestFormat::Pipfile => pipfile::PipfileWriter.write(deps, writer),
        ManifestFormat::Pyproject => pyproject::PyprojectWriter::new(project).write(deps, writer),
    }
}

/// Render resolved dependencies to a string.
pub fn render_to_string(
    format: ManifestFormat,
    deps: &[ResolvedDependency],
    project: &ProjectInfo,
) -> ManifestResult<String> {
    let mut buffer = Vec::new();
    render(format, deps, project, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ManifestError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write rendered content to `output`, replacing any existing file.
pub fn write_manifest(output: &Path, content: &str) -> ManifestResult<PathBuf> {
    fs::write(output, content).map_err(|source| ManifestError::Write {
        path: output.display().to_string(),
        source,
    })?;
    info!(path = %output.display(), bytes = content.len(), "manifest written");
    Ok(output.to_path_buf())
}

/// Resolve `deps`, render them in `format` and overwrite `output`.
///
/// Returns the path written. Filesystem errors are returned to the caller.
pub fn generate_manifest(
    deps: &DependencySet,
    format: ManifestFormat,
    output: &Path,
    source: &dyn VersionSource,
    project: &ProjectInfo,
) -> ManifestResult<PathBuf> {
    let resolved = resolve_all(deps, source);
    let content = render_to_string(format, &resolved, project)?;
    write_manifest(output, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MockVersionSource, RegistryError};

    fn source_with(versions: &'static [(&'static str, &'static str)]) -> MockVersionSource {
        let mut source = MockVersionSource::new();
        source.expect_latest_version().returning(move |name| {
            versions
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string())
                .ok_or_else(|| RegistryError::NotFound(name.to_string()))
        });
        source
    }

    #[test]
    fn test_manifest_format_from_str() {
        assert_eq!(
            "requirements".parse::<ManifestFormat>().unwrap(),
            ManifestFormat::Requirements
        );
        assert_eq!(
            "Pipfile".parse::<ManifestFormat>().unwrap(),
            ManifestFormat::Pipfile
        );
        assert_eq!(
            "PYPROJECT".parse::<ManifestFormat>().unwrap(),
            ManifestFormat::Pyproject
        );
        assert!("setup.py".parse::<ManifestFormat>().is_err());
    }

    #[test]
    fn test_manifest_format_display() {
        assert_eq!(format!("{}", ManifestFormat::Requirements), "requirements");
        assert_eq!(format!("{}", ManifestFormat::Pipfile), "pipfile");
        assert_eq!(format!("{}", ManifestFormat::Pyproject), "pyproject");
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(ManifestFormat::Requirements.default_file_name(), "requirements.txt");
        assert_eq!(ManifestFormat::Pipfile.default_file_name(), "Pipfile");
        assert_eq!(ManifestFormat::Pyproject.default_file_name(), "pyproject.toml");
    }

    #[test]
    fn test_resolve_all_calls_source_once_per_name() {
        let deps: DependencySet = ["foo", "bar"].into_iter().collect();
        let mut source = MockVersionSource::new();
        source
            .expect_latest_version()
            .times(2)
            .returning(|name| match name {
                "bar" => Ok("2.3.1".to_string()),
                _ => Err(RegistryError::NotFound(name.to_string())),
            });

        let resolved = resolve_all(&deps, &source);

        assert_eq!(
            resolved,
            vec![
                ResolvedDependency::new("bar", Some("2.3.1".to_string())),
                ResolvedDependency::unpinned("foo"),
            ]
        );
    }

    #[test]
    fn test_generate_manifest_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("requirements.txt");
        fs::write(&output, "stale==0.0.1\nold-entry\n").unwrap();

        let deps: DependencySet = ["bar"].into_iter().collect();
        let written = generate_manifest(
            &deps,
            ManifestFormat::Requirements,
            &output,
            &source_with(&[("bar", "2.3.1")]),
            &ProjectInfo::default(),
        )
        .unwrap();

        assert_eq!(written, output);
        assert_eq!(fs::read_to_string(&output).unwrap(), "bar==2.3.1\n");
    }

    #[test]
    fn test_generate_manifest_write_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing-dir").join("requirements.txt");

        let deps: DependencySet = ["bar"].into_iter().collect();
        let result = generate_manifest(
            &deps,
            ManifestFormat::Requirements,
            &output,
            &source_with(&[]),
            &ProjectInfo::default(),
        );

        assert!(matches!(result, Err(ManifestError::Write { .. })));
    }

    #[test]
    fn test_render_is_deterministic() {
        let deps: DependencySet = ["numpy", "attrs", "flask"].into_iter().collect();
        let source = source_with(&[("numpy", "2.1.0"), ("flask", "3.0.3")]);

        for format in [
            ManifestFormat::Requirements,
            ManifestFormat::Pipfile,
            ManifestFormat::Pyproject,
        ] {
            let project = ProjectInfo::new("demo");
            let first = render_to_string(format, &resolve_all(&deps, &source), &project).unwrap();
            let second = render_to_string(format, &resolve_all(&deps, &source), &project).unwrap();
            assert_eq!(first, second, "{} output changed between runs", format);
        }
    }

    #[test]
    fn test_project_info_from_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("my-service");
        fs::create_dir(&root).unwrap();

        assert_eq!(ProjectInfo::from_root(&root).name, "my-service");
    }
}

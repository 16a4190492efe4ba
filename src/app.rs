//! The scan → resolve → write pipeline.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::analysis::{scan_project, AnalysisError, ScanOutcome, ScanReport};
use crate::config::{Config, RegistryConfig};
use crate::manifest::{
    render_to_string, resolve_all, write_manifest, ManifestError, ProjectInfo,
};
use crate::parser::ResolvedDependency;
use crate::registry::{PypiRegistry, RegistryError, Unversioned, VersionSource};
use crate::stdlib::StandardLibrary;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to set up registry client: {0}")]
    Registry(#[from] RegistryError),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No third-party imports were found; nothing was written.
    NoDependencies(ScanReport),
    /// The manifest was written to `path`.
    Written {
        path: PathBuf,
        resolved: Vec<ResolvedDependency>,
        report: ScanReport,
    },
    /// The manifest was rendered but not written.
    Rendered {
        content: String,
        resolved: Vec<ResolvedDependency>,
        report: ScanReport,
    },
}

impl Outcome {
    /// Statistics from the scan that preceded this outcome.
    pub fn report(&self) -> &ScanReport {
        match self {
            Outcome::NoDependencies(report) => report,
            Outcome::Written { report, .. } | Outcome::Rendered { report, .. } => report,
        }
    }
}

/// Build the version source described by `registry`.
pub fn version_source(registry: &RegistryConfig) -> Result<Box<dyn VersionSource>, RegistryError> {
    if !registry.enabled {
        return Ok(Box::new(Unversioned));
    }
    Ok(Box::new(PypiRegistry::new(
        registry.url.clone(),
        registry.timeout,
    )?))
}

/// Scan the configured project.
pub fn scan(config: &Config, stdlib: &StandardLibrary) -> Result<ScanOutcome, RunError> {
    Ok(scan_project(&config.root, stdlib, config.scan.clone())?)
}

/// Resolve the scanned dependencies and either write the manifest or render
/// it for printing.
pub fn generate(
    config: &Config,
    scanned: &ScanOutcome,
    source: &dyn VersionSource,
) -> Result<Outcome, RunError> {
    info!(format = %config.format, "generating manifest");
    let resolved = resolve_all(&scanned.dependencies, source);
    let pinned = resolved.iter().filter(|d| d.is_pinned()).count();
    info!(total = resolved.len(), pinned, "dependencies resolved");

    let project = ProjectInfo::from_root(&config.root);
    let content = render_to_string(config.format, &resolved, &project)?;

    let report = scanned.report.clone();
    if config.dry_run {
        return Ok(Outcome::Rendered {
            content,
            resolved,
            report,
        });
    }

    let path = write_manifest(&config.output_path(), &content)?;
    Ok(Outcome::Written {
        path,
        resolved,
        report,
    })
}

/// Run the whole pipeline. An empty scan short-circuits before any registry
/// call or file write.
pub fn run(
    config: &Config,
    stdlib: &StandardLibrary,
    source: &dyn VersionSource,
) -> Result<Outcome, RunError> {
    let scanned = scan(config, stdlib)?;
    if scanned.dependencies.is_empty() {
        return Ok(Outcome::NoDependencies(scanned.report));
    }
    generate(config, &scanned, source)
}

//! Package registry lookups.
//!
//! A [`VersionSource`] reports the latest published version of a package.
//! Lookups are best effort: [`resolve_version`] collapses every failure
//! (network, timeout, not found, malformed response) into `None`, and the
//! dependency is then written without a pinned version.

pub mod pypi;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::debug;

pub use pypi::{PypiRegistry, DEFAULT_PYPI_REGISTRY, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Version lookup disabled")]
    Disabled,
}

/// Something that knows the latest version of a package.
#[cfg_attr(test, automock)]
pub trait VersionSource {
    /// Fetch the latest published version of `package`.
    ///
    /// The name is used verbatim; no mapping from import name to
    /// distribution name is attempted.
    fn latest_version(&self, package: &str) -> Result<String, RegistryError>;
}

/// A source that never resolves anything. Used when version lookup is
/// switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unversioned;

impl VersionSource for Unversioned {
    fn latest_version(&self, _package: &str) -> Result<String, RegistryError> {
        Err(RegistryError::Disabled)
    }
}

/// Look up `package`, turning any failure into "version unknown".
pub fn resolve_version(source: &dyn VersionSource, package: &str) -> Option<String> {
    match source.latest_version(package) {
        Ok(version) => {
            debug!(package, %version, "resolved");
            Some(version)
        }
        Err(e) => {
            debug!(package, error = %e, "version unknown");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_resolve_version_found() {
        let mut source = MockVersionSource::new();
        source
            .expect_latest_version()
            .with(eq("bar"))
            .times(1)
            .returning(|_| Ok("2.3.1".to_string()));

        assert_eq!(resolve_version(&source, "bar"), Some("2.3.1".to_string()));
    }

    #[test]
    fn test_resolve_version_not_found() {
        let mut source = MockVersionSource::new();
        source
            .expect_latest_version()
            .times(1)
            .returning(|name| Err(RegistryError::NotFound(name.to_string())));

        assert_eq!(resolve_version(&source, "foo"), None);
    }

    #[test]
    fn test_resolve_version_invalid_response() {
        let mut source = MockVersionSource::new();
        source
            .expect_latest_version()
            .returning(|_| Err(RegistryError::InvalidResponse("not json".to_string())));

        assert_eq!(resolve_version(&source, "foo"), None);
    }

    #[test]
    fn test_unversioned_never_resolves() {
        assert!(matches!(
            Unversioned.latest_version("requests"),
            Err(RegistryError::Disabled)
        ));
        assert_eq!(resolve_version(&Unversioned, "requests"), None);
    }
}

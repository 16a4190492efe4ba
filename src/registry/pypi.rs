//! PyPI registry client for fetching Python package versions

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::{RegistryError, VersionSource};

pub const DEFAULT_PYPI_REGISTRY: &str = "https://pypi.org";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// PyPI registry client
pub struct PypiRegistry {
    client: Client,
    base_url: String,
}

impl PypiRegistry {
    /// Create a client for the registry at `base_url` with a per-request
    /// timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .user_agent(concat!("reqgen/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for pypi.org with the default timeout.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::new(
            DEFAULT_PYPI_REGISTRY,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn package_url(&self, package_name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package_name)
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
}

/// Package information from PyPI
#[derive(Debug, Deserialize)]
struct PypiInfo {
    /// Latest version (according to PyPI)
    version: String,
}

impl VersionSource for PypiRegistry {
    fn latest_version(&self, package_name: &str) -> Result<String, RegistryError> {
        let url = self.package_url(package_name);
        debug!("Fetching PyPI package: {}", url);

        let response = self.client.get(&url).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if response.status() != reqwest::StatusCode::OK {
            return Err(RegistryError::InvalidResponse(format!(
                "PyPI API returned status {}",
                response.status()
            )));
        }

        let body = response.text()?;
        let pypi_response: PypiResponse = serde_json::from_str(&body)
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        let version = pypi_response.info.version.trim();
        if version.is_empty() {
            return Err(RegistryError::InvalidResponse(format!(
                "empty version for {}",
                package_name
            )));
        }

        Ok(version.to_string())
    }
}

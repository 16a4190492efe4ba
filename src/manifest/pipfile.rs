//! Pipfile writer.
//!
//! Emits the PyPI `[[source]]` block pipenv expects, followed by a
//! `[packages]` section mapping each name to its version or `"*"`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::{ManifestResult, ManifestWriter, WILDCARD};
use crate::parser::ResolvedDependency;

const PYPI_SIMPLE_URL: &str = "https://pypi.org/simple";

/// Pipfile writer implementation.
pub struct PipfileWriter;

#[derive(Serialize)]
struct Pipfile<'a> {
    source: Vec<PipfileSource>,
    packages: BTreeMap<&'a str, &'a str>,
}

#[derive(Serialize)]
struct PipfileSource {
    url: &'static str,
    verify_ssl: bool,
    name: &'static str,
}

impl ManifestWriter for PipfileWriter {
    fn write<W: Write>(&self, deps: &[ResolvedDependency], writer: &mut W) -> ManifestResult<()> {
        let pipfile = Pipfile {
            source: vec![PipfileSource {
                url: PYPI_SIMPLE_URL,
                verify_ssl: true,
                name: "pypi",
            }],
            packages: deps
                .iter()
                .map(|d| (d.name.as_str(), d.version.as_deref().unwrap_or(WILDCARD)))
                .collect(),
        };

        writer.write_all(toml::to_string(&pipfile)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(deps: &[ResolvedDependency]) -> String {
        let mut output = Vec::new();
        PipfileWriter.write(deps, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_pipfile_packages_section() {
        let output = render(&[
            ResolvedDependency::new("requests", Some("2.32.3".to_string())),
            ResolvedDependency::unpinned("mystery"),
        ]);

        assert!(output.contains("[packages]"));
        assert!(output.contains("requests = \"2.32.3\""));
        assert!(output.contains("mystery = \"*\""));
    }

    #[test]
    fn test_pipfile_is_valid_toml() {
        let output = render(&[
            ResolvedDependency::new("flask", Some("3.0.3".to_string())),
            ResolvedDependency::unpinned("foo"),
        ]);

        let parsed: toml::Table = toml::from_str(&output).unwrap();
        let packages = parsed["packages"].as_table().unwrap();
        assert_eq!(packages["flask"].as_str(), Some("3.0.3"));
        assert_eq!(packages["foo"].as_str(), Some("*"));

        let source = parsed["source"].as_array().unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source[0]["name"].as_str(), Some("pypi"));
        assert_eq!(source[0]["verify_ssl"].as_bool(), Some(true));
    }

    #[test]
    fn test_pipfile_empty_packages() {
        let output = render(&[]);
        let parsed: toml::Table = toml::from_str(&output).unwrap();
        assert!(parsed["packages"].as_table().unwrap().is_empty());
    }
}

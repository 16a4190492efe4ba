//! pyproject.toml writer.
//!
//! Produces a poetry project: a `[tool.poetry]` header, the
//! `[tool.poetry.dependencies]` table and a `[build-system]` table.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::{ManifestResult, ManifestWriter, ProjectInfo, WILDCARD};
use crate::parser::ResolvedDependency;

const INITIAL_VERSION: &str = "0.1.0";

/// pyproject writer implementation.
pub struct PyprojectWriter<'a> {
    project: &'a ProjectInfo,
}

impl<'a> PyprojectWriter<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        Self { project }
    }
}

#[derive(Serialize)]
struct Pyproject<'a> {
    tool: Tool<'a>,
    #[serde(rename = "build-system")]
    build_system: BuildSystem,
}

#[derive(Serialize)]
struct Tool<'a> {
    poetry: Poetry<'a>,
}

#[derive(Serialize)]
struct Poetry<'a> {
    name: &'a str,
    version: &'static str,
    description: &'static str,
    authors: Vec<String>,
    dependencies: BTreeMap<&'a str, &'a str>,
}

#[derive(Serialize)]
struct BuildSystem {
    requires: Vec<&'static str>,
    #[serde(rename = "build-backend")]
    build_backend: &'static str,
}

impl ManifestWriter for PyprojectWriter<'_> {
    fn write<W: Write>(&self, deps: &[ResolvedDependency], writer: &mut W) -> ManifestResult<()> {
        let pyproject = Pyproject {
            tool: Tool {
                poetry: Poetry {
                    name: &self.project.name,
                    version: INITIAL_VERSION,
                    description: "",
                    authors: Vec::new(),
                    dependencies: deps
                        .iter()
                        .map(|d| (d.name.as_str(), d.version.as_deref().unwrap_or(WILDCARD)))
                        .collect(),
                },
            },
            build_system: BuildSystem {
                requires: vec!["poetry-core"],
                build_backend: "poetry.core.masonry.api",
            },
        };

        writer.write_all(toml::to_string(&pyproject)?.as_bytes())?;
        Ok(())
    }
}

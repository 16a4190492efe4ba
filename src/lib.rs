//! reqgen - generate Python dependency manifests from a project's imports
//!
//! This crate scans a Python project for the third-party modules it imports,
//! looks up the latest version of each on PyPI, and writes a
//! `requirements.txt`, `Pipfile` or `pyproject.toml`.

pub mod analysis;
pub mod app;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod parser;
pub mod registry;
pub mod stdlib;

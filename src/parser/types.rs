//! Shared types for dependency discovery.
//!
//! This module defines the values that flow through the pipeline: module
//! names collected from source files, the filtered dependency set, and the
//! resolved name/version pairs handed to the manifest writers.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// A top-level importable unit, e.g. `requests` for `import requests.adapters`.
pub type ModuleName = String;

/// Returns the first dot-separated segment of an import target.
///
/// ```
/// use reqgen::parser::types::top_level_name;
///
/// assert_eq!(top_level_name("google.protobuf.message"), "google");
/// assert_eq!(top_level_name("numpy"), "numpy");
/// ```
pub fn top_level_name(dotted: &str) -> &str {
    dotted.split('.').next().unwrap_or(dotted).trim()
}

/// The set of third-party module names a project imports.
///
/// Backed by an ordered set, so iteration (and every manifest rendered from
/// it) is sorted and stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    names: BTreeSet<ModuleName>,
}

impl DependencySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module name. Returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<ModuleName>) -> bool {
        self.names.insert(name.into())
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

    /// Iterate over names in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, ModuleName> {
        self.names.iter()
    }

    /// Keep only the names for which `keep` returns true, returning how many
    /// were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.names.len();
        self.names.retain(|name| keep(name));
        before - self.names.len()
    }
}

impl<S: Into<ModuleName>> FromIterator<S> for DependencySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<ModuleName>> Extend<S> for DependencySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ModuleName;
    type IntoIter = btree_set::Iter<'a, ModuleName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// A dependency paired with the version the registry reported, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Package name, used verbatim from the import.
    pub name: ModuleName,
    /// Latest published version, or `None` when the lookup failed.
    pub version: Option<String>,
}

impl ResolvedDependency {
    pub fn new(name: impl Into<ModuleName>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// A dependency with no known version.
    pub fn unpinned(name: impl Into<ModuleName>) -> Self {
        Self::new(name, None)
    }

    pub fn is_pinned(&self) -> bool {
        self.version.is_some()
    }
}

impl fmt::Display for ResolvedDependency {
    /// Formats as a requirements line: `name==version` or bare `name`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

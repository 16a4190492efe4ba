//! requirements.txt writer.
//!
//! One dependency per line: `name==version`, or the bare name when the
//! version is unknown.

use super::{ManifestResult, ManifestWriter};
use crate::parser::ResolvedDependency;
use std::io::Write;

/// Plain pinned-list writer.
pub struct RequirementsWriter;

impl ManifestWriter for RequirementsWriter {
    fn write<W: Write>(&self, deps: &[ResolvedDependency], writer: &mut W) -> ManifestResult<()> {
        for dep in deps {
            writeln!(writer, "{}", dep)?;
        }
        Ok(())
    }
}

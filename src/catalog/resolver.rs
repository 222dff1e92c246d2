//! Expansion of an `ArtifactSpec` into concrete actions.
//!
//! Absence at any level of the catalog is an expected outcome, not a fault:
//! every lookup returns an `Option` and a `None` simply prunes that branch.
//! Only [`validate`] reports absence, and it runs before any task exists.

use super::{Catalog, FileDescriptor};
use crate::request::{ArtifactSpec, Mode, SoftwareEntry};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One fetch or removal derived from a request and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAction {
    pub tool: String,
    pub arch: String,
    pub version: String,
    pub file_name: String,
    pub url: String,
    pub mode: Mode,
    /// True when the request asked for overwrite or a source override hit this leaf.
    pub overwrite: bool,
}

impl ResolvedAction {
    /// Where the file lives: `<root>/<tool>/release/<arch>/<version>/<file_name>`.
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.tool)
            .join("release")
            .join(&self.arch)
            .join(&self.version)
            .join(&self.file_name)
    }
}

/// Expand `spec` against `catalog`.
///
/// Order is theme × software entry × arch × version × file, with empty
/// themes meaning every catalog theme and empty versions meaning every
/// version listed for that tool/arch, both in document order.
pub fn resolve(catalog: &Catalog, spec: &ArtifactSpec) -> Vec<ResolvedAction> {
    let mut actions = Vec::new();

    for theme in spec.effective_themes(catalog) {
        for entry in &spec.software {
            for arch in &entry.archs {
                for version in versions_for(catalog, theme, entry, arch) {
                    let Some(files) = catalog.leaf(theme, &entry.tool, arch, &version) else {
                        continue;
                    };
                    actions.extend(
                        files
                            .iter()
                            .map(|file| build_action(spec, entry, arch, &version, file)),
                    );
                }
            }
        }
    }

    actions
}

/// Requested versions, or every version the catalog lists for the tool/arch.
fn versions_for(catalog: &Catalog, theme: &str, entry: &SoftwareEntry, arch: &str) -> Vec<String> {
    if !entry.versions.is_empty() {
        return entry.versions.clone();
    }
    catalog
        .versions(theme, &entry.tool, arch)
        .map(|versions| versions.keys().cloned().collect())
        .unwrap_or_default()
}

fn build_action(
    spec: &ArtifactSpec,
    entry: &SoftwareEntry,
    arch: &str,
    version: &str,
    file: &FileDescriptor,
) -> ResolvedAction {
    let (url, overwrite) = match spec.source_overrides.lookup(&entry.tool, arch, version) {
        Some(url) => (url.to_string(), true),
        None => (file.source.clone(), spec.overwrite),
    };

    ResolvedAction {
        tool: entry.tool.clone(),
        arch: arch.to_string(),
        version: version.to_string(),
        file_name: file.name.clone(),
        url,
        mode: spec.mode,
        overwrite,
    }
}

/// Report software entries the catalog cannot satisfy at all.
///
/// An entry is supported as soon as one of its (arch, version) pairs exists
/// under any effective theme; otherwise one diagnostic naming the tool and
/// its requested archs and versions is produced.
pub fn validate(catalog: &Catalog, spec: &ArtifactSpec) -> Vec<String> {
    let themes = spec.effective_themes(catalog);

    spec.software
        .iter()
        .filter(|entry| !is_supported(catalog, &themes, entry))
        .map(|entry| {
            format!(
                "no catalog entry for tool '{}' (archs: [{}], versions: [{}])",
                entry.tool,
                entry.archs.join(", "),
                entry.versions.join(", ")
            )
        })
        .collect()
}

fn is_supported(catalog: &Catalog, themes: &[&str], entry: &SoftwareEntry) -> bool {
    themes.iter().any(|theme| {
        entry.archs.iter().any(|arch| {
            catalog
                .versions(theme, &entry.tool, arch)
                .is_some_and(|versions| {
                    // Empty requested versions: any listed version counts.
                    if entry.versions.is_empty() {
                        !versions.is_empty()
                    } else {
                        entry.versions.iter().any(|v| versions.contains_key(v))
                    }
                })
        })
    })
}

//! Artifact catalog.
//!
//! The catalog is a four-level document: theme → tool → architecture →
//! version → ordered list of files. It is loaded fresh for every request and
//! never mutated afterwards.
//!
//! ```text
//! edge:
//!   kubectl:
//!     x86_64:
//!       "1.30":
//!         - name: kubectl
//!           source: https://dl.k8s.io/release/v1.30.0/bin/linux/amd64/kubectl
//! ```
//!
//! Document order is preserved at every level so that resolution is
//! deterministic.

mod resolver;


pub use resolver::{ResolvedAction, resolve, validate};

use crate::error::{DepotError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One downloadable file at a catalog leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name written under the version directory.
    pub name: String,
    /// URL the file is fetched from.
    pub source: String,
}

/// Version → files.
pub type VersionMap = IndexMap<String, Vec<FileDescriptor>>;
/// Architecture → versions.
pub type ArchMap = IndexMap<String, VersionMap>;
/// Tool → architectures.
pub type ToolMap = IndexMap<String, ArchMap>;

/// Immutable view of the catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    themes: IndexMap<String, ToolMap>,
}

impl Catalog {
    /// Load and parse the catalog at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DepotError::CatalogError(format!(
                "failed to read catalog '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            DepotError::CatalogError(msg) => {
                DepotError::CatalogError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse a catalog from YAML text. An empty document is an empty catalog.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let themes: Option<IndexMap<String, Option<ToolMap>>> = serde_yaml::from_str(yaml)
            .map_err(|e| DepotError::CatalogError(format!("malformed catalog: {}", e)))?;

        // A theme key with no body (`edge:`) is kept as an empty theme.
        let themes = themes
            .unwrap_or_default()
            .into_iter()
            .map(|(theme, tools)| (theme, tools.unwrap_or_default()))
            .collect();

        Ok(Self { themes })
    }

    /// Theme names in document order.
    pub fn themes(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Tools declared under `theme`.
    pub fn tools(&self, theme: &str) -> Option<&ToolMap> {
        self.themes.get(theme)
    }

    /// Architectures declared for `tool` under `theme`.
    pub fn archs(&self, theme: &str, tool: &str) -> Option<&ArchMap> {
        self.tools(theme).and_then(|tools| tools.get(tool))
    }

    /// Versions declared for `tool`/`arch` under `theme`.
    pub fn versions(&self, theme: &str, tool: &str, arch: &str) -> Option<&VersionMap> {
        self.archs(theme, tool).and_then(|archs| archs.get(arch))
    }

    /// Files at a fully specified leaf.
    pub fn leaf(&self, theme: &str, tool: &str, arch: &str, version: &str) -> Option<&[FileDescriptor]> {
        self.versions(theme, tool, arch)
            .and_then(|versions| versions.get(version))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

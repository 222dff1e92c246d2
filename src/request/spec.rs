//! Artifact requests: the wire form and the checked `ArtifactSpec`.

use crate::catalog::Catalog;
use crate::error::{DepotError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with each resolved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Download the file into place.
    #[serde(rename = "download")]
    Fetch,
    /// Delete the file if present.
    #[serde(rename = "remove")]
    Remove,
}

impl Mode {
    /// Parse the wire spelling of a mode.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "download" => Some(Self::Fetch),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fetch => "download",
            Mode::Remove => "remove",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-supplied URLs keyed by tool → arch → version.
///
/// A hit replaces the catalog URL and forces overwrite for every file at that leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceOverrides(IndexMap<String, IndexMap<String, IndexMap<String, String>>>);

impl SourceOverrides {
    pub fn lookup(&self, tool: &str, arch: &str, version: &str) -> Option<&str> {
        self.0
            .get(tool)
            .and_then(|archs| archs.get(arch))
            .and_then(|versions| versions.get(version))
            .map(String::as_str)
    }

    /// Register an override.
    #[cfg(test)]
    pub fn insert(&mut self, tool: &str, arch: &str, version: &str, url: &str) {
        self.0
            .entry(tool.to_string())
            .or_default()
            .entry(arch.to_string())
            .or_default()
            .insert(version.to_string(), url.to_string());
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One tool selection within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareEntry {
    pub tool: String,
    pub archs: Vec<String>,
    /// Empty means every version the catalog lists for the tool/arch.
    pub versions: Vec<String>,
}

/// A checked request naming a subset of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    /// Empty means every catalog theme. Never contains duplicates.
    pub themes: Vec<String>,
    pub software: Vec<SoftwareEntry>,
    pub mode: Mode,
    pub overwrite: bool,
    pub source_overrides: SourceOverrides,
}

impl ArtifactSpec {
    /// Themes to traverse: the requested set, or every catalog theme in
    /// document order when none were requested.
    pub fn effective_themes<'a>(&'a self, catalog: &'a Catalog) -> Vec<&'a str> {
        if self.themes.is_empty() {
            catalog.themes().collect()
        } else {
            self.themes.iter().map(String::as_str).collect()
        }
    }

    /// A spec covering everything in the catalog.
    ///
    /// Entries for the same tool across themes are merged, so a tool listed in
    /// several themes contributes one entry whose archs and versions are the
    /// union of what each theme declares.
    pub fn all_from_catalog(catalog: &Catalog, mode: Mode, overwrite: bool) -> Self {
        let mut merged: IndexMap<&str, (Vec<String>, Vec<String>)> = IndexMap::new();

        for theme in catalog.themes() {
            let Some(tools) = catalog.tools(theme) else {
                continue;
            };
            for (tool, archs) in tools {
                let (arch_list, version_list) = merged.entry(tool.as_str()).or_default();
                for (arch, versions) in archs {
                    push_unique(arch_list, arch);
                    for version in versions.keys() {
                        push_unique(version_list, version);
                    }
                }
            }
        }

        let software = merged
            .into_iter()
            .map(|(tool, (archs, versions))| SoftwareEntry {
                tool: tool.to_string(),
                archs,
                versions,
            })
            .collect();

        Self {
            themes: catalog.themes().map(str::to_string).collect(),
            software,
            mode,
            overwrite,
            source_overrides: SourceOverrides::default(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Wire form of a software entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSoftware {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub archs: Option<Vec<String>>,
    #[serde(default)]
    pub versions: Option<Vec<String>>,
}

/// Wire form of an artifact request.
///
/// ```text
/// {"themes": [...], "software": [{"name", "archs", "versions"}],
///  "mode": "download" | "remove", "overwrite": false,
///  "sources": {tool: {arch: {version: url}}}}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManageRequest {
    #[serde(default)]
    pub themes: Option<Vec<String>>,
    #[serde(default)]
    pub software: Option<Vec<RawSoftware>>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub overwrite: Option<bool>,
    #[serde(default)]
    pub sources: Option<SourceOverrides>,
}

impl ManageRequest {
    /// Check the request and build an `ArtifactSpec`.
    ///
    /// Rejects a missing or empty `software` list, a missing or unknown
    /// `mode`, and software entries without a `name`.
    pub fn into_spec(self) -> Result<ArtifactSpec> {
        let raw_software = self
            .software
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DepotError::UserError("request is missing 'software'".to_string()))?;

        let raw_mode = self
            .mode
            .ok_or_else(|| DepotError::UserError("request is missing 'mode'".to_string()))?;
        let mode = Mode::from_str(&raw_mode).ok_or_else(|| {
            DepotError::UserError(format!(
                "unknown mode '{}' (expected 'download' or 'remove')",
                raw_mode
            ))
        })?;

        let software = raw_software
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                let tool = raw.name.filter(|n| !n.is_empty()).ok_or_else(|| {
                    DepotError::UserError(format!("software entry {} is missing 'name'", idx))
                })?;
                Ok(SoftwareEntry {
                    tool,
                    archs: raw.archs.unwrap_or_default(),
                    versions: raw.versions.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut themes = Vec::new();
        for theme in self.themes.unwrap_or_default() {
            push_unique(&mut themes, &theme);
        }

        Ok(ArtifactSpec {
            themes,
            software,
            mode,
            overwrite: self.overwrite.unwrap_or(false),
            source_overrides: self.sources.unwrap_or_default(),
        })
    }
}

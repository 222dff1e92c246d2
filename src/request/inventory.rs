//! Playbook requests and the generated inventory.

use crate::error::{DepotError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A host the playbook targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub host: String,
    pub user: String,
}

/// Servers handed to the playbook runner as a single `[servers]` group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub servers: Vec<Server>,
}

impl Inventory {
    /// Check the `inventory` object of a request.
    ///
    /// `servers` must be a list (absent means empty) and every entry must be
    /// an object carrying string `host` and `user` fields. One bad entry
    /// rejects the whole inventory.
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        let servers = match value.and_then(|v| v.get("servers")) {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(DepotError::UserError(
                    "invalid inventory format: 'servers' must be a list".to_string(),
                ));
            }
        };

        let servers = servers
            .iter()
            .enumerate()
            .map(|(idx, entry)| -> Result<Server> {
                let field = |name: &str| {
                    entry
                        .get(name)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .ok_or_else(|| {
                            DepotError::UserError(format!(
                                "invalid inventory format: server {} is missing '{}'",
                                idx, name
                            ))
                        })
                };
                Ok(Server {
                    host: field("host")?,
                    user: field("user")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { servers })
    }

    /// Render as an INI inventory.
    pub fn render(&self) -> String {
        let mut out = String::from("[servers]\n");
        for server in &self.servers {
            out.push_str(&format!("{} ansible_user={}\n", server.host, server.user));
        }
        out
    }

    /// Write the rendered inventory to a temporary `.ini` file.
    ///
    /// The file is deleted when the returned handle is dropped, whichever
    /// path the owning task exits by.
    pub fn write_temp(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("depot-inventory-")
            .suffix(".ini")
            .tempfile()
            .map_err(|e| DepotError::UserError(format!("failed to create inventory file: {}", e)))?;

        file.write_all(self.render().as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| DepotError::UserError(format!("failed to write inventory file: {}", e)))?;

        Ok(file)
    }
}

/// Wire form of a playbook request.
///
/// ```text
/// {"playbook": "playbooks/site.yml",
///  "inventory": {"servers": [{"host": "10.0.0.5", "user": "root"}]},
///  "extra_vars": {...}}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaybookRequest {
    #[serde(default, alias = "playbook_path")]
    pub playbook: Option<PathBuf>,
    #[serde(default)]
    pub inventory: Option<Value>,
    #[serde(default)]
    pub extra_vars: Option<Map<String, Value>>,
}

/// A checked playbook request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybookSpec {
    /// Playbook path, resolved and confirmed to exist.
    pub playbook: PathBuf,
    pub inventory: Inventory,
    pub extra_vars: Map<String, Value>,
}

impl PlaybookRequest {
    /// Check the request.
    ///
    /// Relative playbook paths resolve against `base_dir`. A playbook that
    /// does not exist or an invalid inventory rejects the request.
    pub fn into_spec(self, default_playbook: &Path, base_dir: &Path) -> Result<PlaybookSpec> {
        let playbook = self.playbook.unwrap_or_else(|| default_playbook.to_path_buf());
        let playbook = if playbook.is_absolute() {
            playbook
        } else {
            base_dir.join(playbook)
        };

        if !playbook.is_file() {
            return Err(DepotError::UserError(format!(
                "playbook not found: {}",
                playbook.display()
            )));
        }

        let inventory = Inventory::from_value(self.inventory.as_ref())?;

        Ok(PlaybookSpec {
            playbook,
            inventory,
            extra_vars: self.extra_vars.unwrap_or_default(),
        })
    }
}

//! Config struct and defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file read when `--config` is not given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "depot.yaml";

/// Environment variable overriding `tasks_dir`.
pub const ENV_TASKS_DIR: &str = "TASKS_DIR";

/// Environment variable overriding `max_tasks`.
pub const ENV_MAX_TASKS: &str = "MAX_TASKS";

/// Configuration for a depot process.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Task history
    // =========================================================================
    /// Root directory of the task store; one subdirectory per task id.
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: PathBuf,

    /// Retained task count before the oldest record is evicted.
    #[serde(default = "default_max_tasks")]
    pub max_tasks: usize,

    // =========================================================================
    // Artifacts
    // =========================================================================
    /// Catalog document, re-read for every request.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Destination root: `<roles_dir>/<tool>/release/<arch>/<version>/<file>`.
    #[serde(default = "default_roles_dir")]
    pub roles_dir: PathBuf,

    /// Per-request HTTP timeout in seconds (0 disables).
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    // =========================================================================
    // Playbooks
    // =========================================================================
    /// Playbook used when a request does not name one.
    #[serde(default = "default_playbook")]
    pub default_playbook: PathBuf,

    /// Program (plus leading args) invoked to run a playbook.
    #[serde(default = "default_playbook_command")]
    pub playbook_command: String,
}

fn default_tasks_dir() -> PathBuf {
    PathBuf::from("tasks")
}
fn default_max_tasks() -> usize {
    3
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from("meta.yml")
}
fn default_roles_dir() -> PathBuf {
    PathBuf::from("roles")
}
fn default_download_timeout_secs() -> u64 {
    300
}
fn default_playbook() -> PathBuf {
    PathBuf::from("playbooks/playbook.yml")
}
fn default_playbook_command() -> String {
    "ansible-playbook".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_dir: default_tasks_dir(),
            max_tasks: default_max_tasks(),
            catalog_path: default_catalog_path(),
            roles_dir: default_roles_dir(),
            download_timeout_secs: default_download_timeout_secs(),
            default_playbook: default_playbook(),
            playbook_command: default_playbook_command(),
        }
    }
}

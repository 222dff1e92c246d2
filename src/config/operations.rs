//! Config loading, environment overrides, and validation.

use super::model::{Config, ENV_MAX_TASKS, ENV_TASKS_DIR};
use crate::error::{DepotError, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DepotError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::parse_yaml(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply in both cases.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a YAML string. Environment overrides are not applied.
    #[cfg(test)]
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| DepotError::UserError(format!("failed to parse config YAML: {}", e)))
    }

    /// Apply `TASKS_DIR` and `MAX_TASKS` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var(ENV_TASKS_DIR)
            && !dir.is_empty()
        {
            self.tasks_dir = PathBuf::from(dir);
        }

        if let Ok(raw) = std::env::var(ENV_MAX_TASKS) {
            self.max_tasks = raw.trim().parse().map_err(|_| {
                DepotError::UserError(format!(
                    "{} must be a positive integer (found '{}')",
                    ENV_MAX_TASKS, raw
                ))
            })?;
        }

        Ok(())
    }

    /// Validate config values.
    ///
    /// - `max_tasks` must be positive
    /// - `playbook_command` must contain a program
    /// - path fields must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_tasks == 0 {
            return Err(DepotError::UserError(
                "config validation failed: max_tasks must be greater than 0".to_string(),
            ));
        }

        if self.playbook_command.trim().is_empty() {
            return Err(DepotError::UserError(
                "config validation failed: playbook_command must not be empty".to_string(),
            ));
        }

        for (name, path) in [
            ("tasks_dir", &self.tasks_dir),
            ("catalog_path", &self.catalog_path),
            ("roles_dir", &self.roles_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(DepotError::UserError(format!(
                    "config validation failed: {} must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }
}

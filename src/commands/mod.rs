//! Command implementations for depot.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the pieces they share: config loading and waiting
//! on a submitted task.

mod manage;
mod playbook;
mod status;
mod validate;

use crate::cli::Command;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{DepotError, Result};
use crate::task::{Task, TaskHandle, TaskStatus, TaskStore};
use std::path::Path;

/// Load the config named on the command line, or `depot.yaml` if present.
///
/// An explicit `--config` must exist; the implicit default may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_or_default(DEFAULT_CONFIG_FILE),
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Manage(args) => manage::cmd_manage(config, args),
        Command::ManageAll(args) => manage::cmd_manage_all(config, args),
        Command::Validate(args) => validate::cmd_validate(config, args),
        Command::Playbook(args) => playbook::cmd_playbook(config, args),
        Command::Status(args) => status::cmd_status(config, args),
        Command::Tasks => status::cmd_tasks(config),
    }
}

/// Print the task id, block until the task finishes, then print its record.
///
/// A task that ends `failed` is reported as an action error so the process
/// exit code reflects it.
fn wait_and_report(store: &TaskStore, handle: TaskHandle) -> Result<()> {
    let id = handle.id().to_string();
    println!("{}", id);

    handle.wait()?;

    let task = store
        .get(&id)?
        .ok_or_else(|| DepotError::StoreError(format!("record for task {} disappeared", id)))?;
    print_task(&task)?;

    match task.status {
        TaskStatus::Failed(message) => Err(DepotError::ActionError(message)),
        _ => Ok(()),
    }
}

fn print_task(task: &Task) -> Result<()> {
    let json = serde_json::to_string_pretty(task)
        .map_err(|e| DepotError::StoreError(format!("failed to encode task {}: {}", task.id, e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("nope.yaml"))).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn test_status_of_unknown_task_is_user_error() {
        let temp = TempDir::new().unwrap();
        let config = crate::test_support::test_config(temp.path());

        let err = dispatch(
            &config,
            Command::Status(crate::cli::StatusArgs {
                task_id: "missing".to_string(),
            }),
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().contains("task 'missing' not found"));
    }

    #[test]
    fn test_validate_unsupported_request_exits_with_validation_failure() {
        let temp = TempDir::new().unwrap();
        let config = crate::test_support::test_config(temp.path());
        crate::test_support::write_catalog(&config, "edge:\n  kubectl:\n    x86_64:\n      \"1.30\": []\n");
        let request = temp.path().join("req.json");
        std::fs::write(
            &request,
            r#"{"software": [{"name": "helm", "archs": ["x86_64"]}], "mode": "download"}"#,
        )
        .unwrap();

        let err = dispatch(
            &config,
            Command::Validate(crate::cli::RequestArgs { request }),
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }
}

//! Implementation of `depot status` and `depot tasks`.

use super::print_task;
use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::task::TaskStore;

/// Execute `depot status`.
pub fn cmd_status(config: &Config, args: StatusArgs) -> Result<()> {
    let store = TaskStore::new(config);
    let task = store.get(&args.task_id)?.ok_or_else(|| {
        DepotError::UserError(format!(
            "task '{}' not found.\n\n\
             Only the most recent {} tasks are retained. Use `depot tasks` to list them.",
            args.task_id, config.max_tasks
        ))
    })?;
    print_task(&task)
}

/// Execute `depot tasks`.
///
/// One line per retained task, oldest first.
pub fn cmd_tasks(config: &Config) -> Result<()> {
    let store = TaskStore::new(config);
    let tasks = store.list()?;

    if tasks.is_empty() {
        println!("No tasks recorded in {}", store.root().display());
        return Ok(());
    }

    for task in &tasks {
        let started = task
            .start_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}  {}  {}", task.id, started, task.status);
    }
    Ok(())
}

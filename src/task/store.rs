//! File-backed task history.
//!
//! Layout: `<tasks_dir>/<task_id>/status.json`, plus whatever side artifacts
//! a task leaves in its directory (playbook runner logs). Eviction removes
//! the whole directory.
//!
//! # Capacity
//!
//! Before each write the store counts task directories; if the count
//! exceeds `max_tasks`, the single oldest directory (by creation time) is
//! deleted, even when it belongs to the task being written; the write that
//! follows recreates that record. The count is taken before the new record
//! lands, so the steady state holds up to `max_tasks + 1` records. The
//! count-then-delete sequence
//! is not atomic with other writers, so concurrent submissions can push the
//! total a little higher still. Eviction is best-effort: failures are logged
//! and never prevent the write that triggered them.

use super::{Task, TaskRecord, is_valid_task_id};
use crate::config::Config;
use crate::error::{DepotError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

const STATUS_FILE: &str = "status.json";

/// Bounded, file-backed collection of task records.
#[derive(Debug, Clone)]
pub struct TaskStore {
    root: PathBuf,
    max_tasks: usize,
}

/// A task directory found on disk.
#[derive(Debug)]
struct StoredEntry {
    id: String,
    path: PathBuf,
    created: SystemTime,
}

impl TaskStore {
    /// Store rooted at `config.tasks_dir` with capacity `config.max_tasks`.
    pub fn new(config: &Config) -> Self {
        Self::with_capacity(&config.tasks_dir, config.max_tasks)
    }

    pub fn with_capacity(root: impl Into<PathBuf>, max_tasks: usize) -> Self {
        Self {
            root: root.into(),
            max_tasks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the record and side artifacts for `id`.
    pub fn task_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Persist `task`, evicting the oldest record first if over capacity.
    ///
    /// The record is replaced atomically. If the writer's own directory is the
    /// oldest it is the one evicted, side artifacts included, and the write
    /// recreates it.
    pub fn put(&self, task: &Task) -> Result<()> {
        if !is_valid_task_id(&task.id) {
            return Err(DepotError::StoreError(format!(
                "invalid task id '{}'",
                task.id
            )));
        }

        if let Err(e) = self.evict_if_over_capacity() {
            warn!(task_id = %task.id, error = %e, "task history eviction failed");
        }

        let json = serde_json::to_string(&task.to_record()).map_err(|e| {
            DepotError::StoreError(format!("failed to encode task {}: {}", task.id, e))
        })?;
        crate::fs::atomic_write_file(self.task_dir(&task.id).join(STATUS_FILE), &json)?;

        debug!(task_id = %task.id, status = %task.status, "task record written");
        Ok(())
    }

    /// Load the record for `id`, or `None` when no such task is retained.
    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        if !is_valid_task_id(id) {
            return Ok(None);
        }

        let path = self.task_dir(id).join(STATUS_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DepotError::StoreError(format!(
                    "failed to read '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        let record: TaskRecord = serde_json::from_str(&content).map_err(|e| {
            DepotError::StoreError(format!("corrupt task record '{}': {}", path.display(), e))
        })?;
        Ok(Some(Task::from_record(id, record)))
    }

    /// Every retained task, oldest first. Unreadable records are skipped.
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for entry in self.entries_oldest_first()? {
            match self.get(&entry.id) {
                Ok(Some(task)) => tasks.push(task),
                Ok(None) => {}
                Err(e) => warn!(task_id = %entry.id, error = %e, "skipping unreadable task record"),
            }
        }
        Ok(tasks)
    }

    /// Number of task directories currently on disk.
    #[cfg(test)]
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries_oldest_first()?.len())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn evict_if_over_capacity(&self) -> Result<()> {
        let entries = self.entries_oldest_first()?;
        if entries.len() <= self.max_tasks {
            return Ok(());
        }

        let oldest = &entries[0];

        match fs::remove_dir_all(&oldest.path) {
            Ok(()) => {
                info!(task_id = %oldest.id, retained = entries.len() - 1, "evicted oldest task record");
                Ok(())
            }
            // Another writer got there first.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DepotError::StoreError(format!(
                "failed to evict '{}': {}",
                oldest.path.display(),
                e
            ))),
        }
    }

    /// Task directories sorted by creation time, ties broken by id.
    ///
    /// Falls back to modification time where the filesystem does not report
    /// creation time. A missing root is an empty store.
    fn entries_oldest_first(&self) -> Result<Vec<StoredEntry>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DepotError::StoreError(format!(
                    "failed to list '{}': {}",
                    self.root.display(),
                    e
                )));
            }
        };

        let mut entries: Vec<StoredEntry> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let id = entry.file_name().to_str()?.to_string();
                if !is_valid_task_id(&id) {
                    return None;
                }
                let metadata = entry.metadata().ok()?;
                if !metadata.is_dir() {
                    return None;
                }
                let created = metadata.created().or_else(|_| metadata.modified()).ok()?;
                Some(StoredEntry {
                    id,
                    path: entry.path(),
                    created,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }
}

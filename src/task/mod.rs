//! Task records and their lifecycle.
//!
//! A task is one background unit of work. Its record is small and always
//! written whole:
//!
//! ```text
//! {"status": "failed: download failed (404 Not Found) for https://...",
//!  "start_time": "2026-01-13T10:00:00Z",
//!  "end_time": "2026-01-13T10:00:04Z"}
//! ```
//!
//! Status moves from `running` to exactly one terminal value and never back.

mod runner;
mod store;


pub use runner::{TaskHandle, TaskRunner};
pub use store::TaskStore;

use crate::error::{DepotError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a task.
///
/// Serialized as the literal strings `running`, `completed`, and
/// `failed: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed(String),
}

const FAILED_PREFIX: &str = "failed";

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Running => f.write_str("running"),
            TaskStatus::Completed => f.write_str("completed"),
            TaskStatus::Failed(message) => write!(f, "{}: {}", FAILED_PREFIX, message),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            FAILED_PREFIX => Ok(TaskStatus::Failed(String::new())),
            other => other
                .strip_prefix(FAILED_PREFIX)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|message| TaskStatus::Failed(message.trim_start().to_string()))
                .ok_or_else(|| format!("unknown task status '{}'", other)),
        }
    }
}

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    pub id: String,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// On-disk form of a task; the id is the directory name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TaskRecord {
    pub status: TaskStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Task {
    /// A freshly submitted task.
    pub fn started(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Running,
            start_time: Some(now),
            end_time: None,
        }
    }

    /// Generate a new opaque task id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Mark the task completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.finish(TaskStatus::Completed, now)
    }

    /// Mark the task failed with `message`.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        self.finish(TaskStatus::Failed(message.into()), now)
    }

    fn finish(&mut self, status: TaskStatus, now: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(DepotError::StoreError(format!(
                "task {} is already '{}' and cannot become '{}'",
                self.id, self.status, status
            )));
        }
        self.status = status;
        self.end_time = Some(now);
        Ok(())
    }

    pub(crate) fn to_record(&self) -> TaskRecord {
        TaskRecord {
            status: self.status.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    pub(crate) fn from_record(id: impl Into<String>, record: TaskRecord) -> Self {
        Self {
            id: id.into(),
            status: record.status,
            start_time: record.start_time,
            end_time: record.end_time,
        }
    }
}

/// Whether `id` is safe to use as a directory name inside the store.
pub fn is_valid_task_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

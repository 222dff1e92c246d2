//! Side-effecting collaborators the task runner drives.
//!
//! Both traits are object safe and `Send + Sync` so one executor can be
//! shared by every task thread behind an `Arc`.

mod command;
mod http;

pub use command::{AnsiblePlaybook, CommandExecutor};
#[cfg(test)]
pub use command::CommandOutcome;
pub use http::HttpExecutor;

use crate::error::Result;
use std::path::Path;

/// Idempotent fetch/remove primitives over a destination path.
pub trait ActionExecutor: Send + Sync {
    /// Transfer `url` to `dest`.
    ///
    /// A no-op when `dest` exists and `overwrite` is false; otherwise `dest`
    /// is replaced. Parent directories are created as needed.
    fn fetch(&self, url: &str, dest: &Path, overwrite: bool) -> Result<()>;

    /// Delete `dest`. A no-op when it does not exist.
    fn remove(&self, dest: &Path) -> Result<()>;
}

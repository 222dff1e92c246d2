//! Implementation of `depot playbook`.

use super::wait_and_report;
use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::request::{self, PlaybookRequest};
use crate::task::TaskRunner;

/// Execute `depot playbook`.
///
/// Relative playbook paths resolve against the current directory. A bad
/// inventory or missing playbook is rejected before a task id is issued.
pub fn cmd_playbook(config: &Config, args: RequestArgs) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        DepotError::UserError(format!("failed to determine current directory: {}", e))
    })?;
    let spec = request::read_json::<PlaybookRequest>(&args.request)?
        .into_spec(&config.default_playbook, &cwd)?;

    let runner = TaskRunner::from_config(config)?;
    let handle = runner.submit_playbook(spec)?;
    wait_and_report(runner.store(), handle)
}

//! Implementation of `depot validate`.

use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::request::{self, ManageRequest};
use crate::task::TaskRunner;

/// Execute `depot validate`.
///
/// Prints one line per unsupported entry. Never starts a task.
pub fn cmd_validate(config: &Config, args: RequestArgs) -> Result<()> {
    let spec = request::read_json::<ManageRequest>(&args.request)?.into_spec()?;
    let runner = TaskRunner::from_config(config)?;

    let unsupported = runner.check(&spec)?;
    if unsupported.is_empty() {
        println!("All {} entries supported.", spec.software.len());
        return Ok(());
    }

    for descriptor in &unsupported {
        println!("unsupported: {}", descriptor);
    }
    Err(DepotError::ValidationError(unsupported))
}

//! Implementation of `depot manage` and `depot manage-all`.

use super::wait_and_report;
use crate::cli::{ManageAllArgs, ModeArg, RequestArgs};
use crate::config::Config;
use crate::error::Result;
use crate::request::{self, ArtifactSpec, ManageRequest, Mode};
use crate::task::TaskRunner;
use tracing::{info, warn};

/// Execute `depot manage`.
///
/// Decodes and validates the request, then runs it as a task and waits.
/// An unsupported entry rejects the whole request before any task exists.
pub fn cmd_manage(config: &Config, args: RequestArgs) -> Result<()> {
    let spec = request::read_json::<ManageRequest>(&args.request)?.into_spec()?;
    let runner = TaskRunner::from_config(config)?;

    let handle = runner.submit(spec)?;
    wait_and_report(runner.store(), handle)
}

/// Execute `depot manage-all`.
///
/// Covers every tool in every theme. The request is derived from the catalog
/// itself, so it is submitted without validation.
pub fn cmd_manage_all(config: &Config, args: ManageAllArgs) -> Result<()> {
    let runner = TaskRunner::from_config(config)?;
    let catalog = runner.load_catalog()?;
    if catalog.is_empty() {
        warn!(path = %config.catalog_path.display(), "catalog is empty, nothing to manage");
    }

    let mode = match args.mode {
        ModeArg::Download => Mode::Fetch,
        ModeArg::Remove => Mode::Remove,
    };
    let spec = ArtifactSpec::all_from_catalog(&catalog, mode, args.overwrite);
    info!(tools = spec.software.len(), %mode, "managing entire catalog");

    let handle = runner.submit_unchecked(spec)?;
    wait_and_report(runner.store(), handle)
}

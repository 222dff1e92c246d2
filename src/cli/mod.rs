//! CLI argument parsing for depot.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Depot: catalog-driven artifact fetcher with background task tracking.
///
/// Requests name a subset of a hierarchical catalog
/// (theme → tool → arch → version → files). Each accepted request runs as a
/// background task whose status is recorded under the tasks directory.
#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (default: depot.yaml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "depot=debug").
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for depot.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch or remove the artifacts a request selects.
    ///
    /// The request is validated against the catalog first; nothing runs if
    /// any entry is unsupported.
    Manage(RequestArgs),

    /// Fetch or remove every artifact in the catalog.
    ManageAll(ManageAllArgs),

    /// Check a request against the catalog without running it.
    Validate(RequestArgs),

    /// Run a playbook against a generated inventory.
    Playbook(RequestArgs),

    /// Print the recorded status of a task.
    Status(StatusArgs),

    /// List retained tasks, oldest first.
    Tasks,
}

/// A JSON request document.
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// Request file, or "-" to read from stdin.
    pub request: PathBuf,
}

/// Mode accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Download,
    Remove,
}

/// Arguments for the `manage-all` command.
#[derive(Parser, Debug)]
pub struct ManageAllArgs {
    #[arg(long, value_enum, default_value = "download")]
    pub mode: ModeArg,

    /// Replace files that are already present.
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Task id printed by `manage`, `manage-all`, or `playbook`.
    pub task_id: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_manage_from_stdin() {
        let cli = Cli::try_parse_from(["depot", "manage", "-"]).unwrap();
        match cli.command {
            Command::Manage(args) => assert_eq!(args.request, PathBuf::from("-")),
            other => panic!("Expected Manage command, got {:?}", other),
        }
        assert!(cli.config.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parse_manage_all_defaults() {
        let cli = Cli::try_parse_from(["depot", "manage-all"]).unwrap();
        if let Command::ManageAll(args) = cli.command {
            assert_eq!(args.mode, ModeArg::Download);
            assert!(!args.overwrite);
        } else {
            panic!("Expected ManageAll command");
        }
    }

    #[test]
    fn parse_manage_all_remove_with_overwrite() {
        let cli =
            Cli::try_parse_from(["depot", "manage-all", "--mode", "remove", "--overwrite"]).unwrap();
        if let Command::ManageAll(args) = cli.command {
            assert_eq!(args.mode, ModeArg::Remove);
            assert!(args.overwrite);
        } else {
            panic!("Expected ManageAll command");
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "depot",
            "status",
            "abc-123",
            "--config",
            "/etc/depot.yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/depot.yaml")));
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Command::Status(ref a) if a.task_id == "abc-123"));
    }

    #[test]
    fn parse_tasks() {
        let cli = Cli::try_parse_from(["depot", "tasks"]).unwrap();
        assert!(matches!(cli.command, Command::Tasks));
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["depot", "manage-all", "--mode", "purge"]).is_err());
    }

    #[test]
    fn parse_requires_request_argument() {
        assert!(Cli::try_parse_from(["depot", "validate"]).is_err());
    }
}

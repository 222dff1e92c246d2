//! Depot: catalog-driven artifact fetcher with background task tracking.
//!
//! This is the main entry point for the `depot` CLI. It parses arguments,
//! sets up logging, loads configuration, dispatches to the appropriate
//! command handler, and handles errors with proper exit codes.

mod catalog;
mod cli;
mod commands;
mod config;
mod error;
mod executor;
mod exit_codes;
mod fs;
mod request;
mod task;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // RUST_LOG wins over --log-level. Logs go to stderr; stdout carries results.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();

    let result = commands::load_config(cli.config.as_deref())
        .and_then(|config| commands::dispatch(&config, cli.command));

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

//! Configuration model for depot.
//!
//! A single `Config` value describes where the catalog, task history, and
//! fetched artifacts live. It is loaded once in `main` and passed by value or
//! reference into every component that needs it.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::{Config, DEFAULT_CONFIG_FILE};

#[cfg(test)]
pub use model::{ENV_MAX_TASKS, ENV_TASKS_DIR};

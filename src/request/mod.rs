//! Request decoding.
//!
//! Requests arrive as JSON documents. Each is decoded into a loosely typed
//! wire struct first and then checked into a strongly typed value; every
//! check here happens before a task id is issued, so a rejected request never
//! leaves a record behind.

mod inventory;
mod spec;


pub use inventory::{PlaybookRequest, PlaybookSpec};
pub use spec::{ArtifactSpec, ManageRequest, Mode, SoftwareEntry};

#[cfg(test)]
pub use inventory::{Inventory, Server};
#[cfg(test)]
pub use spec::SourceOverrides;

use crate::error::{DepotError, Result};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

/// Read a JSON request from `path`, or from stdin when `path` is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| DepotError::UserError(format!("failed to read request from stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            DepotError::UserError(format!(
                "failed to read request file '{}': {}",
                path.display(),
                e
            ))
        })?
    };

    parse_json(&content)
}

/// Parse a JSON request body.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T> {
    serde_json::from_str(content)
        .map_err(|e| DepotError::UserError(format!("malformed request: {}", e)))
}

//! HTTP(S) and `file://` transfers.

use super::ActionExecutor;
use crate::error::{DepotError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default `ActionExecutor`.
///
/// `http://` and `https://` URLs are downloaded with a blocking reqwest
/// client; `file://` URLs are copied from the local filesystem. Either way the
/// bytes land in a temporary file beside the destination first and are then
/// renamed into place, so an interrupted transfer never leaves a truncated
/// artifact behind.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Build an executor; `timeout_secs == 0` disables the request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("depot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DepotError::UserError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn download(&self, url: &str, writer: &mut fs::File) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DepotError::ActionError(format!("failed to download {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DepotError::ActionError(format!(
                "download failed ({}) for {}",
                status, url
            )));
        }

        response
            .copy_to(writer)
            .map_err(|e| DepotError::ActionError(format!("failed reading body of {}: {}", url, e)))
    }

    fn copy_local(&self, source: &Path, writer: &mut fs::File) -> Result<u64> {
        let mut reader = fs::File::open(source).map_err(|e| {
            DepotError::ActionError(format!("failed to open {}: {}", source.display(), e))
        })?;
        io::copy(&mut reader, writer).map_err(|e| {
            DepotError::ActionError(format!("failed to copy {}: {}", source.display(), e))
        })
    }
}

impl ActionExecutor for HttpExecutor {
    fn fetch(&self, url: &str, dest: &Path, overwrite: bool) -> Result<()> {
        if dest.exists() && !overwrite {
            debug!(path = %dest.display(), "artifact already present, skipping");
            return Ok(());
        }

        let parent = dest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent).map_err(|e| {
            DepotError::ActionError(format!("failed to create {}: {}", parent.display(), e))
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".depot-download-")
            .tempfile_in(&parent)
            .map_err(|e| {
                DepotError::ActionError(format!(
                    "failed to allocate temporary file in {}: {}",
                    parent.display(),
                    e
                ))
            })?;

        let bytes = match url.strip_prefix("file://") {
            Some(local) => self.copy_local(Path::new(local), tmp.as_file_mut())?,
            None if url.starts_with("http://") || url.starts_with("https://") => {
                self.download(url, tmp.as_file_mut())?
            }
            None => {
                return Err(DepotError::ActionError(format!(
                    "unsupported URL scheme: {}",
                    url
                )));
            }
        };

        tmp.as_file().sync_all().map_err(|e| {
            DepotError::ActionError(format!("failed to sync {}: {}", dest.display(), e))
        })?;
        tmp.persist(dest).map_err(|e| {
            DepotError::ActionError(format!("failed to move download into {}: {}", dest.display(), e.error))
        })?;

        info!(url, path = %dest.display(), bytes, "artifact fetched");
        Ok(())
    }

    fn remove(&self, dest: &Path) -> Result<()> {
        match fs::remove_file(dest) {
            Ok(()) => {
                info!(path = %dest.display(), "artifact removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %dest.display(), "artifact absent, nothing to remove");
                Ok(())
            }
            Err(e) => Err(DepotError::ActionError(format!(
                "failed to delete {}: {}",
                dest.display(),
                e
            ))),
        }
    }
}

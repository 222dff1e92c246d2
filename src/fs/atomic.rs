//! Atomic file writes for task records.
//!
//! A status record is always replaced as a whole: content goes to a uniquely
//! named temporary file in the target directory, is synced, and is then renamed
//! over the target. Readers see either the previous record or the new one,
//! never a mix of the two.
//!
//! Source and destination share a directory, so the rename never crosses a
//! filesystem boundary. On crash a `.{filename}.{suffix}.tmp` file may remain.

use crate::error::{DepotError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            DepotError::StoreError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    atomic_replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Temp path next to the target. The random suffix keeps concurrent writers
/// of the same record from clobbering each other's temp file.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DepotError::StoreError(format!("invalid file path '{}'", target.display()))
        })?;

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    Ok(parent.join(format!(".{}.{}.tmp", filename, &suffix[..8])))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        DepotError::StoreError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            DepotError::StoreError(format!(
                "failed to write temporary file '{}': {}",
                path.display(),
                e
            ))
        })
}

/// `rename` replaces an existing target on both POSIX and Windows.
fn atomic_replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        DepotError::StoreError(format!(
            "failed to atomically replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

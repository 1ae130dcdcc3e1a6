//! Advisory lock file next to a data file.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tiffin_core::{Error, Result};

/// Exclusive claim on a data file, held until dropped.
///
/// The lock is a sibling file created with `create_new` and holding the
/// owner's pid. A crashed process leaves it behind; it must then be
/// removed by hand.
#[derive(Debug)]
pub(crate) struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Creates the lock file at `path`, failing if it already exists.
    pub(crate) fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                let lock = Self { path };
                writeln!(file, "{}", std::process::id())?;
                file.sync_all()?;
                tracing::debug!(path = %lock.path.display(), "Data file lock acquired");
                Ok(lock)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = std::fs::read_to_string(&path)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                let holder = if holder.is_empty() {
                    "another process".to_string()
                } else {
                    format!("process {holder}")
                };
                Err(Error::storage(format!(
                    "Data file is locked by {holder}; stop it first, or remove {} if it is stale",
                    path.display()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lock file location.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Data file lock released"),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove lock file")
            }
        }
    }
}

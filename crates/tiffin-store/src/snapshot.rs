//! Snapshot persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tiffin_core::{Error, Result};

use crate::lock::LockFile;
use crate::tables::Tables;

const SNAPSHOT_VERSION: u32 = 1;

/// Where committed state is persisted.
pub trait SnapshotStore: Send + Sync {
    /// Claims the backing storage for this process until dropped.
    ///
    /// Called once by [`Store::open`](crate::Store::open) before loading.
    fn claim(&self) -> Result<()> {
        Ok(())
    }

    /// Loads the last snapshot, or `None` if there is none yet.
    fn load(&self) -> Result<Option<Tables>>;

    /// Persists a snapshot of committed state.
    fn save(&self, tables: &Tables) -> Result<()>;
}

/// Keeps nothing; state lives only in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshots;

impl SnapshotStore for NoSnapshots {
    fn load(&self) -> Result<Option<Tables>> {
        Ok(None)
    }

    fn save(&self, _tables: &Tables) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    tables: &'a Tables,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    tables: Tables,
}

/// A JSON file, replaced atomically on every save.
///
/// Once claimed, a `<name>.lock` file beside the data file keeps other
/// processes from opening it until this value is dropped.
#[derive(Debug)]
pub struct JsonFileSnapshots {
    path: PathBuf,
    lock: Mutex<Option<LockFile>>,
}

impl JsonFileSnapshots {
    /// Snapshots stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(None),
        }
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock file location.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_file_name(format!("{}.lock", self.file_name()))
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("snapshot")
    }

    fn temp_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!(".{}.tmp.{}", self.file_name(), std::process::id()))
    }
}

impl SnapshotStore for JsonFileSnapshots {
    fn claim(&self) -> Result<()> {
        let mut held = self
            .lock
            .lock()
            .map_err(|_| Error::storage("snapshot lock poisoned"))?;
        if held.is_none() {
            *held = Some(LockFile::acquire(self.lock_path())?);
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<Tables>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let snapshot: SnapshotIn = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::storage(format!(
                "Unsupported snapshot version {} in {}",
                snapshot.version,
                self.path.display()
            )));
        }
        Ok(Some(snapshot.tables))
    }

    fn save(&self, tables: &Tables) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = SnapshotOut {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            tables,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.temp_path();
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

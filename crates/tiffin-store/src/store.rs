//! The lock-guarded record store.

use std::sync::{Arc, RwLock};

use tiffin_core::{Error, Result};

use crate::snapshot::{NoSnapshots, SnapshotStore};
use crate::tables::Tables;
use crate::transaction::Transaction;

/// Shared handle to all records.
///
/// Cheap to clone. Readers run concurrently; writers are serialized and
/// each write is all-or-nothing.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    tables: RwLock<Tables>,
    snapshots: Box<dyn SnapshotStore>,
}

impl Store {
    /// An empty, memory-only store.
    pub fn in_memory() -> Self {
        Self::from_tables(Tables::default(), NoSnapshots)
    }

    /// Opens a store, loading the last snapshot if one exists.
    ///
    /// Fails if another process already holds the backing storage.
    pub fn open(snapshots: impl SnapshotStore + 'static) -> Result<Self> {
        snapshots.claim()?;
        let tables = snapshots.load()?.unwrap_or_default();
        tracing::info!(
            users = tables.users.len(),
            vendors = tables.vendors.len(),
            subscriptions = tables.subscriptions.len(),
            pending_requests = tables.requests.values().filter(|r| r.is_pending()).count(),
            "Store opened"
        );
        Ok(Self::from_tables(tables, snapshots))
    }

    /// Wraps existing tables.
    pub fn from_tables(tables: Tables, snapshots: impl SnapshotStore + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(tables),
                snapshots: Box::new(snapshots),
            }),
        }
    }

    /// Runs `f` against a consistent view of the tables.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tables) -> T,
    {
        let tables = self
            .inner
            .tables
            .read()
            .map_err(|_| Error::storage("store lock poisoned"))?;
        Ok(f(&tables))
    }

    /// Runs `f` in an exclusive transaction.
    ///
    /// If `f` fails, or the snapshot of the new state cannot be saved,
    /// every change made by `f` is undone and the error is returned.
    pub fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut guard = self
            .inner
            .tables
            .write()
            .map_err(|_| Error::storage("store lock poisoned"))?;
        let mut tx = Transaction::new(&mut guard);

        let out = match f(&mut tx) {
            Ok(out) => out,
            Err(e) => {
                if tx.is_dirty() {
                    tracing::debug!(changes = tx.len(), error = %e, "Rolling back transaction");
                }
                tx.rollback();
                return Err(e);
            }
        };

        if tx.is_dirty()
            && let Err(e) = self.inner.snapshots.save(tx.tables())
        {
            tracing::error!(error = %e, "Snapshot failed, rolling back transaction");
            tx.rollback();
            return Err(e);
        }
        Ok(out)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<Tables> {
        self.read(Tables::clone)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

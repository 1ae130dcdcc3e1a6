//! Undo-logged write transactions.
//!
//! A [`Transaction`] mutates the live [`Tables`] directly and records, for
//! every change, a closure that restores the previous value. Rolling back
//! replays those closures newest first.

use tiffin_core::{Error, Result};

use crate::tables::{Record, Tables};

type Undo = Box<dyn FnOnce(&mut Tables) + Send>;

/// An open write transaction.
///
/// Obtained through [`Store::write`](crate::Store::write); commits when the
/// closure returns `Ok`, rolls back otherwise.
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    undo: Vec<Undo>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(tables: &'a mut Tables) -> Self {
        Self {
            tables,
            undo: Vec::new(),
        }
    }

    /// Read-only view of the current (uncommitted) state.
    pub fn tables(&self) -> &Tables {
        self.tables
    }

    /// Looks up a record.
    pub fn get<R: Record>(&self, id: R::Id) -> Option<&R> {
        self.tables.get(id)
    }

    /// Looks up a record, failing with `NotFound`.
    pub fn require<R: Record>(&self, id: R::Id) -> Result<&R> {
        self.tables.require(id)
    }

    /// Inserts or replaces a record, returning the previous value.
    pub fn put<R: Record>(&mut self, record: R) -> Option<R> {
        let id = record.id();
        let previous = R::table_mut(self.tables).insert(id, record);
        let restore = previous.clone();
        self.undo.push(Box::new(move |tables: &mut Tables| {
            let table = R::table_mut(tables);
            match restore {
                Some(old) => {
                    table.insert(id, old);
                }
                None => {
                    table.remove(&id);
                }
            }
        }));
        previous
    }

    /// Inserts a new record; fails if the key is taken.
    pub fn insert<R: Record>(&mut self, record: R) -> Result<R::Id> {
        let id = record.id();
        if self.get::<R>(id).is_some() {
            return Err(Error::conflict(format!("{} {id} already exists", R::ENTITY)));
        }
        self.put(record);
        Ok(id)
    }

    /// Applies `f` to a copy of the record and stores the result.
    ///
    /// Nothing is written if `f` fails.
    pub fn update<R, T, F>(&mut self, id: R::Id, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut R) -> Result<T>,
    {
        let mut record = self.require::<R>(id)?.clone();
        let out = f(&mut record)?;
        self.put(record);
        Ok(out)
    }

    /// Removes a record, failing with `NotFound`.
    pub fn remove<R: Record>(&mut self, id: R::Id) -> Result<R> {
        let removed = R::table_mut(self.tables)
            .remove(&id)
            .ok_or_else(|| Error::not_found(R::ENTITY, id))?;
        let restore = removed.clone();
        self.undo.push(Box::new(move |tables: &mut Tables| {
            R::table_mut(tables).insert(id, restore);
        }));
        Ok(removed)
    }

    /// Returns `true` if anything was written.
    pub fn is_dirty(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Number of staged changes.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub(crate) fn rollback(self) {
        let Transaction { tables, undo } = self;
        for restore in undo.into_iter().rev() {
            restore(tables);
        }
    }
}

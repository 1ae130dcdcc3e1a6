#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Modules
//!
//! - [`tables`]: The [`Tables`] record set and the [`Record`] trait
//! - [`transaction`]: Undo-logged write transactions
//! - [`snapshot`]: Snapshot persistence backends, with a lock file per data file
//! - [`store`]: The lock-guarded [`Store`]

mod lock;
pub mod snapshot;
pub mod store;
pub mod tables;
pub mod transaction;

pub use snapshot::{JsonFileSnapshots, NoSnapshots, SnapshotStore};
pub use store::Store;
pub use tables::{Record, Tables};
pub use transaction::Transaction;

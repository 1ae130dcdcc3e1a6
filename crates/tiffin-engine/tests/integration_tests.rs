//! Integration test suite for Tiffin workflows.
//!
//! Drives the engine end to end: purchases feeding the assignment queue,
//! approvals moving vendor capacity, orders consuming credits, and state
//! surviving a reopen of the snapshot file.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
mod integration;

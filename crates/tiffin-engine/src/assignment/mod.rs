//! Vendor assignment and vendor switch workflow.
//!
//! Requests wait in a queue ordered by [`queue`] rules, are matched against
//! vendors by [`matcher`], and are resolved by [`AssignmentService`]. Every
//! resolution runs in a single store transaction, so the subscription, the
//! vendors' capacity counters, and the request change together or not at all.

pub mod matcher;
pub mod queue;
mod service;

pub use matcher::{Candidate, Ineligibility, MatchCriteria};
pub use queue::{QueueFilter, QueueStats, QueuedRequest};
pub use service::{AssignedRequest, AssignmentService, AutoAssignReport, SkippedRequest, SwitchInput};

pub(crate) use service::{cancel_pending_for, open_initial_request};

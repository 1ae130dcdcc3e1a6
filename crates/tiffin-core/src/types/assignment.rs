//! Vendor assignment and vendor switch requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{RequestId, SubscriptionId, UserId, VendorId, ZoneId};

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRequestKind {
    /// First vendor for a subscription that has none.
    InitialAssignment,
    /// Replace the current vendor.
    VendorSwitch,
}

impl fmt::Display for AssignmentRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentRequestKind::InitialAssignment => write!(f, "initial_assignment"),
            AssignmentRequestKind::VendorSwitch => write!(f, "vendor_switch"),
        }
    }
}

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Waiting in the queue.
    Pending,
    /// A vendor was assigned.
    Approved,
    /// Turned down by an admin.
    Rejected,
    /// Withdrawn by the user or superseded by a subscription change.
    Cancelled,
}

impl AssignmentStatus {
    /// Returns `true` for Approved, Rejected and Cancelled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AssignmentStatus::Pending)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Pending => write!(f, "pending"),
            AssignmentStatus::Approved => write!(f, "approved"),
            AssignmentStatus::Rejected => write!(f, "rejected"),
            AssignmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Queue priority, ordered `Low < Normal < High < Urgent`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Handle when convenient
    Low,
    /// Default priority
    #[default]
    Normal,
    /// Handle before normal requests
    High,
    /// Handle first
    Urgent,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
    ];

    /// Raises the priority by `levels`, capped at `Urgent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::Priority;
    ///
    /// assert_eq!(Priority::Low.raised(2), Priority::High);
    /// assert_eq!(Priority::High.raised(5), Priority::Urgent);
    /// ```
    pub fn raised(self, levels: u32) -> Priority {
        let index = Self::ALL
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default();
        let raised = index.saturating_add(levels as usize).min(Self::ALL.len() - 1);
        Self::ALL[raised]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// A request to assign or switch the vendor of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAssignmentRequest {
    /// Unique identifier
    pub id: RequestId,
    /// Subscriber
    pub user: UserId,
    /// Subscription being assigned
    pub subscription: SubscriptionId,
    /// Initial assignment or switch
    pub kind: AssignmentRequestKind,
    /// Lifecycle state
    pub status: AssignmentStatus,
    /// Base queue priority
    pub priority: Priority,
    /// Delivery zone of the subscription
    pub zone: ZoneId,
    /// Vendor at the time of the request
    pub current_vendor: Option<VendorId>,
    /// Vendor the user asked for
    pub requested_vendor: Option<VendorId>,
    /// Vendor assigned on approval
    pub assigned_vendor: Option<VendorId>,
    /// User's reason
    pub reason: Option<String>,
    /// Admin notes or rejection reason
    pub admin_notes: Option<String>,
    /// Who resolved the request
    pub processed_by: Option<String>,
    /// When the request was resolved
    pub processed_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl VendorAssignmentRequest {
    /// Creates a pending request.
    pub fn new(
        kind: AssignmentRequestKind,
        user: UserId,
        subscription: SubscriptionId,
        zone: ZoneId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::new(),
            user,
            subscription,
            kind,
            status: AssignmentStatus::Pending,
            priority: Priority::Normal,
            zone,
            current_vendor: None,
            requested_vendor: None,
            assigned_vendor: None,
            reason: None,
            admin_notes: None,
            processed_by: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` while the request is in the queue.
    pub fn is_pending(&self) -> bool {
        self.status == AssignmentStatus::Pending
    }

    /// Priority after aging: one level per `aging_hours` waited.
    ///
    /// Aging is disabled when `aging_hours` is zero.
    pub fn effective_priority(&self, now: DateTime<Utc>, aging_hours: u32) -> Priority {
        if aging_hours == 0 {
            return self.priority;
        }
        let waited = now.signed_duration_since(self.created_at).num_hours().max(0);
        let levels = waited / i64::from(aging_hours);
        self.priority.raised(u32::try_from(levels).unwrap_or(u32::MAX))
    }

    /// Marks the request approved with the given vendor.
    pub fn approve(&mut self, vendor: VendorId, processed_by: &str, notes: Option<String>) -> Result<()> {
        self.resolve(AssignmentStatus::Approved, processed_by, notes)?;
        self.assigned_vendor = Some(vendor);
        Ok(())
    }

    /// Marks the request rejected.
    pub fn reject(&mut self, processed_by: &str, reason: String) -> Result<()> {
        self.resolve(AssignmentStatus::Rejected, processed_by, Some(reason))
    }

    /// Marks the request cancelled.
    pub fn cancel(&mut self, processed_by: &str, note: Option<String>) -> Result<()> {
        self.resolve(AssignmentStatus::Cancelled, processed_by, note)
    }

    fn resolve(
        &mut self,
        status: AssignmentStatus,
        processed_by: &str,
        notes: Option<String>,
    ) -> Result<()> {
        if !self.is_pending() {
            return Err(Error::transition("assignment request", self.status, status));
        }
        let now = Utc::now();
        self.status = status;
        self.processed_by = Some(processed_by.to_string());
        self.processed_at = Some(now);
        if notes.is_some() {
            self.admin_notes = notes;
        }
        self.updated_at = now;
        Ok(())
    }
}

//! Queue ordering, filtering and statistics.
//!
//! Pending requests are served highest effective priority first. Ties go to
//! initial assignments (the subscriber has no vendor at all), then to the
//! oldest request, then to the lowest id so the order is total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use tiffin_core::{
    AssignmentRequestKind, AssignmentStatus, Priority, VendorAssignmentRequest, ZoneId,
};

/// Listing filters for the queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueFilter {
    /// Status to list; pending when unset
    pub status: Option<AssignmentStatus>,
    /// Only this kind
    pub kind: Option<AssignmentRequestKind>,
    /// Only this zone
    pub zone: Option<ZoneId>,
    /// Only this effective priority
    pub priority: Option<Priority>,
}

impl QueueFilter {
    fn matches(&self, request: &VendorAssignmentRequest, effective: Priority) -> bool {
        request.status == self.status.unwrap_or(AssignmentStatus::Pending)
            && self.kind.is_none_or(|k| request.kind == k)
            && self.zone.is_none_or(|z| request.zone == z)
            && self.priority.is_none_or(|p| effective == p)
    }
}

/// A request as seen in the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedRequest {
    /// The request
    #[serde(flatten)]
    pub request: VendorAssignmentRequest,
    /// Priority after aging
    pub effective_priority: Priority,
    /// Whole hours since the request was created
    pub waiting_hours: i64,
}

impl QueuedRequest {
    /// Wraps a request with its queue position data at `now`.
    pub fn at(request: VendorAssignmentRequest, now: DateTime<Utc>, aging_hours: u32) -> Self {
        Self {
            effective_priority: request.effective_priority(now, aging_hours),
            waiting_hours: waiting_hours(&request, now),
            request,
        }
    }
}

/// Counts across the whole request table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueStats {
    /// All requests
    pub total: usize,
    /// Requests by status
    pub by_status: BTreeMap<String, usize>,
    /// Pending requests by kind
    pub pending_by_kind: BTreeMap<String, usize>,
    /// Pending requests by effective priority
    pub pending_by_priority: BTreeMap<String, usize>,
    /// Age of the oldest pending request in hours
    pub oldest_pending_hours: Option<i64>,
}

fn kind_rank(kind: AssignmentRequestKind) -> u8 {
    match kind {
        AssignmentRequestKind::InitialAssignment => 0,
        AssignmentRequestKind::VendorSwitch => 1,
    }
}

fn waiting_hours(request: &VendorAssignmentRequest, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(request.created_at)
        .num_hours()
        .max(0)
}

/// Queue order between two requests at `now`.
pub fn compare(
    a: &VendorAssignmentRequest,
    b: &VendorAssignmentRequest,
    now: DateTime<Utc>,
    aging_hours: u32,
) -> Ordering {
    b.effective_priority(now, aging_hours)
        .cmp(&a.effective_priority(now, aging_hours))
        .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Requests matching `filter`, in queue order.
pub fn ordered<'a, I>(
    requests: I,
    filter: &QueueFilter,
    now: DateTime<Utc>,
    aging_hours: u32,
) -> Vec<&'a VendorAssignmentRequest>
where
    I: IntoIterator<Item = &'a VendorAssignmentRequest>,
{
    let mut matching: Vec<_> = requests
        .into_iter()
        .filter(|r| filter.matches(r, r.effective_priority(now, aging_hours)))
        .collect();
    matching.sort_by(|a, b| compare(a, b, now, aging_hours));
    matching
}

/// Aggregates queue statistics at `now`.
pub fn stats<'a, I>(requests: I, now: DateTime<Utc>, aging_hours: u32) -> QueueStats
where
    I: IntoIterator<Item = &'a VendorAssignmentRequest>,
{
    let mut stats = QueueStats::default();
    for request in requests {
        stats.total += 1;
        *stats.by_status.entry(request.status.to_string()).or_default() += 1;
        if !request.is_pending() {
            continue;
        }
        *stats
            .pending_by_kind
            .entry(request.kind.to_string())
            .or_default() += 1;
        *stats
            .pending_by_priority
            .entry(request.effective_priority(now, aging_hours).to_string())
            .or_default() += 1;
        let waited = waiting_hours(request, now);
        stats.oldest_pending_hours = Some(stats.oldest_pending_hours.map_or(waited, |h| h.max(waited)));
    }
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use tiffin_core::{SubscriptionId, UserId};

    fn request(
        kind: AssignmentRequestKind,
        priority: Priority,
        age_hours: i64,
        now: DateTime<Utc>,
    ) -> VendorAssignmentRequest {
        let mut r =
            VendorAssignmentRequest::new(kind, UserId::new(), SubscriptionId::new(), ZoneId::new());
        r.priority = priority;
        r.created_at = now - Duration::hours(age_hours);
        r
    }

    #[test]
    fn test_priority_then_kind_then_age() {
        let now = Utc::now();
        let old_switch = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 5, now);
        let new_initial = request(AssignmentRequestKind::InitialAssignment, Priority::Normal, 1, now);
        let urgent_switch = request(AssignmentRequestKind::VendorSwitch, Priority::Urgent, 0, now);
        let older_initial =
            request(AssignmentRequestKind::InitialAssignment, Priority::Normal, 3, now);
        let all = [
            old_switch.clone(),
            new_initial.clone(),
            urgent_switch.clone(),
            older_initial.clone(),
        ];

        let order: Vec<_> = ordered(&all, &QueueFilter::default(), now, 0)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(
            order,
            vec![urgent_switch.id, older_initial.id, new_initial.id, old_switch.id]
        );
    }

    #[test]
    fn test_aging_lifts_old_low_requests() {
        let now = Utc::now();
        let stale = request(AssignmentRequestKind::VendorSwitch, Priority::Low, 49, now);
        let fresh = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 0, now);
        let all = [fresh.clone(), stale.clone()];

        let aged = ordered(&all, &QueueFilter::default(), now, 24);
        assert_eq!(aged[0].id, stale.id);
        let unaged = ordered(&all, &QueueFilter::default(), now, 0);
        assert_eq!(unaged[0].id, fresh.id);
    }

    #[test]
    fn test_filter_defaults_to_pending() {
        let now = Utc::now();
        let pending = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 0, now);
        let mut done = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 0, now);
        done.reject("ops", "duplicate".into()).unwrap();
        let all = [pending.clone(), done.clone()];

        let listed = ordered(&all, &QueueFilter::default(), now, 0);
        assert_eq!(listed.len(), 1);
        let rejected = QueueFilter {
            status: Some(AssignmentStatus::Rejected),
            ..QueueFilter::default()
        };
        assert_eq!(ordered(&all, &rejected, now, 0)[0].id, done.id);
    }

    #[test]
    fn test_stats() {
        let now = Utc::now();
        let a = request(AssignmentRequestKind::InitialAssignment, Priority::High, 10, now);
        let b = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 2, now);
        let mut c = request(AssignmentRequestKind::VendorSwitch, Priority::Normal, 30, now);
        c.cancel("user", None).unwrap();

        let stats = stats(&[a, b, c], now, 0);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status["pending"], 2);
        assert_eq!(stats.by_status["cancelled"], 1);
        assert_eq!(stats.pending_by_kind["initial_assignment"], 1);
        assert_eq!(stats.pending_by_priority["high"], 1);
        assert_eq!(stats.oldest_pending_hours, Some(10));
    }

    fn arb_priority() -> impl Strategy<Value = Priority> {
        prop::sample::select(Priority::ALL.to_vec())
    }

    fn arb_kind() -> impl Strategy<Value = AssignmentRequestKind> {
        prop::sample::select(vec![
            AssignmentRequestKind::InitialAssignment,
            AssignmentRequestKind::VendorSwitch,
        ])
    }

    proptest! {
        #[test]
        fn test_queue_order_is_sorted_by_effective_priority(
            specs in prop::collection::vec((arb_kind(), arb_priority(), 0i64..200), 1..30),
            aging in 0u32..48,
        ) {
            let now = Utc::now();
            let all: Vec<_> = specs
                .into_iter()
                .map(|(kind, priority, age)| request(kind, priority, age, now))
                .collect();
            let queue = ordered(&all, &QueueFilter::default(), now, aging);
            prop_assert_eq!(queue.len(), all.len());
            for pair in queue.windows(2) {
                prop_assert!(
                    pair[0].effective_priority(now, aging) >= pair[1].effective_priority(now, aging)
                );
                prop_assert_ne!(compare(pair[0], pair[1], now, aging), Ordering::Greater);
            }
        }
    }
}

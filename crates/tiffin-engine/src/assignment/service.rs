//! Assignment request lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tiffin_core::config::AssignmentConfig;
use tiffin_core::{
    AssignmentRequestKind, AssignmentStatus, Error, Page, PageRequest, Priority, RequestId,
    Result, SubscriptionId, UserId, UserSubscription, VendorAssignmentRequest, VendorCategory,
    VendorId, VendorProfile,
};
use tiffin_store::{Store, Transaction};

use super::matcher::{Candidate, MatchCriteria};
use super::queue::{self, QueueFilter, QueueStats, QueuedRequest};
use crate::validate;

/// Input for a vendor switch request.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchInput {
    /// Subscription to switch
    pub subscription: SubscriptionId,
    /// Subscriber making the request
    pub user: UserId,
    /// Vendor the subscriber would like
    #[serde(default)]
    pub requested_vendor: Option<VendorId>,
    /// Why the subscriber wants to switch
    #[serde(default)]
    pub reason: Option<String>,
    /// Queue priority; normal when unset
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Outcome of an auto-assign run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoAssignReport {
    /// Requests examined
    pub examined: usize,
    /// Requests approved
    pub assigned: Vec<AssignedRequest>,
    /// Requests left pending
    pub skipped: Vec<SkippedRequest>,
}

/// An approved request in an auto-assign run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedRequest {
    /// Request
    pub request: RequestId,
    /// Subscription
    pub subscription: SubscriptionId,
    /// Vendor assigned
    pub vendor: VendorId,
}

/// A request an auto-assign run could not approve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRequest {
    /// Request
    pub request: RequestId,
    /// Why it was skipped
    pub reason: String,
}

/// Vendor assignment workflow.
#[derive(Clone, Debug)]
pub struct AssignmentService {
    store: Store,
    settings: AssignmentConfig,
}

impl AssignmentService {
    /// Creates the service.
    pub fn new(store: Store, settings: AssignmentConfig) -> Self {
        Self { store, settings }
    }

    /// Opens an initial assignment request for a subscription with no vendor.
    pub fn request_initial_assignment(
        &self,
        subscription: SubscriptionId,
    ) -> Result<VendorAssignmentRequest> {
        self.store.write(|tx| {
            let sub = tx.require::<UserSubscription>(subscription)?.clone();
            open_initial_request(tx, &sub)
        })
    }

    /// Opens a vendor switch request.
    pub fn request_switch(&self, input: SwitchInput) -> Result<VendorAssignmentRequest> {
        let reason = validate::optional(input.reason);
        self.store.write(|tx| {
            let sub = tx.require::<UserSubscription>(input.subscription)?.clone();
            if sub.user != input.user {
                return Err(Error::conflict(format!(
                    "subscription {} does not belong to user {}",
                    sub.id, input.user
                )));
            }
            if !sub.status.holds_vendor() {
                return Err(Error::conflict(format!(
                    "cannot switch vendor on a {} subscription",
                    sub.status
                )));
            }
            let Some(current) = sub.vendor else {
                return Err(Error::conflict(format!(
                    "subscription {} has no vendor to switch from",
                    sub.id
                )));
            };
            if sub.vendor_switches_remaining == 0 {
                return Err(Error::conflict(format!(
                    "subscription {} has no vendor switches remaining",
                    sub.id
                )));
            }
            if input.requested_vendor == Some(current) {
                return Err(Error::validation_field(
                    "requested_vendor",
                    "must differ from the current vendor",
                ));
            }
            if let Some(vendor) = input.requested_vendor {
                tx.require::<VendorProfile>(vendor)?;
            }
            ensure_no_pending(tx, sub.id)?;

            let mut request = VendorAssignmentRequest::new(
                AssignmentRequestKind::VendorSwitch,
                sub.user,
                sub.id,
                sub.delivery.zone,
            );
            request.current_vendor = Some(current);
            request.requested_vendor = input.requested_vendor;
            request.reason = reason;
            request.priority = input.priority.unwrap_or_default();
            tx.insert(request.clone())?;
            tracing::info!(
                request = %request.id,
                subscription = %sub.id,
                priority = %request.priority,
                "Vendor switch requested"
            );
            Ok(request)
        })
    }

    /// Approves a pending request.
    ///
    /// The vendor is, in order: `vendor` if given, the subscriber's requested
    /// vendor if still eligible, or the best-ranked candidate.
    pub fn approve(
        &self,
        id: RequestId,
        vendor: Option<VendorId>,
        processed_by: &str,
        notes: Option<String>,
    ) -> Result<VendorAssignmentRequest> {
        let processed_by = validate::non_empty("processed_by", processed_by)?;
        let notes = validate::optional(notes);
        self.store.write(|tx| {
            approve_in(
                tx,
                id,
                vendor,
                &processed_by,
                notes,
                self.settings.min_vendor_rating,
            )
        })
    }

    /// Rejects a pending request. A reason is required.
    pub fn reject(
        &self,
        id: RequestId,
        processed_by: &str,
        reason: &str,
    ) -> Result<VendorAssignmentRequest> {
        let processed_by = validate::non_empty("processed_by", processed_by)?;
        let reason = validate::non_empty("reason", reason)?;
        self.store.write(|tx| {
            let request = tx.update::<VendorAssignmentRequest, _, _>(id, |r| {
                r.reject(&processed_by, reason)?;
                Ok(r.clone())
            })?;
            tracing::info!(request = %id, processed_by = %processed_by, "Assignment request rejected");
            Ok(request)
        })
    }

    /// Withdraws a pending request on behalf of its owner.
    pub fn cancel(&self, id: RequestId, user: UserId) -> Result<VendorAssignmentRequest> {
        self.store.write(|tx| {
            tx.update::<VendorAssignmentRequest, _, _>(id, |r| {
                if r.user != user {
                    return Err(Error::conflict(format!(
                        "request {id} does not belong to user {user}"
                    )));
                }
                r.cancel(&user.to_string(), Some("cancelled by user".to_string()))?;
                Ok(r.clone())
            })
        })
    }

    /// Approves queued requests in order, each in its own transaction.
    ///
    /// Requests that cannot be approved stay pending and are reported as
    /// skipped. Server-side failures abort the run.
    pub fn auto_assign(&self, limit: Option<usize>, processed_by: &str) -> Result<AutoAssignReport> {
        let processed_by = validate::non_empty("processed_by", processed_by)?;
        let limit = limit.unwrap_or(self.settings.auto_assign_batch);
        let now = Utc::now();
        let batch: Vec<RequestId> = self.store.read(|t| {
            queue::ordered(
                t.iter::<VendorAssignmentRequest>(),
                &QueueFilter::default(),
                now,
                self.settings.priority_aging_hours,
            )
            .into_iter()
            .take(limit)
            .map(|r| r.id)
            .collect()
        })?;

        let mut report = AutoAssignReport {
            examined: batch.len(),
            ..AutoAssignReport::default()
        };
        for id in batch {
            let outcome = self.store.write(|tx| {
                approve_in(
                    tx,
                    id,
                    None,
                    &processed_by,
                    Some("auto-assigned".to_string()),
                    self.settings.min_vendor_rating,
                )
            });
            match outcome {
                Ok(request) => {
                    if let Some(vendor) = request.assigned_vendor {
                        report.assigned.push(AssignedRequest {
                            request: id,
                            subscription: request.subscription,
                            vendor,
                        });
                    }
                }
                Err(e) if e.is_client_error() => {
                    tracing::debug!(request = %id, reason = %e, "Auto-assign skipped request");
                    report.skipped.push(SkippedRequest {
                        request: id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            examined = report.examined,
            assigned = report.assigned.len(),
            skipped = report.skipped.len(),
            "Auto-assign finished"
        );
        Ok(report)
    }

    /// Eligible vendors for a request, best first.
    pub fn candidates(
        &self,
        id: RequestId,
        category: Option<VendorCategory>,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        self.store.read(|t| {
            let request = t.require::<VendorAssignmentRequest>(id)?;
            let criteria = MatchCriteria::for_request(t, request, self.settings.min_vendor_rating)?
                .with_category(category);
            Ok(criteria
                .rank(t.iter::<VendorProfile>())
                .into_iter()
                .take(limit)
                .map(Candidate::from)
                .collect())
        })?
    }

    /// One page of the queue.
    pub fn queue(&self, filter: &QueueFilter, page: PageRequest) -> Result<Page<QueuedRequest>> {
        self.queue_at(filter, page, Utc::now())
    }

    /// One page of the queue as it stands at `now`.
    pub fn queue_at(
        &self,
        filter: &QueueFilter,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<QueuedRequest>> {
        let aging = self.settings.priority_aging_hours;
        self.store.read(|t| {
            let ordered = queue::ordered(t.iter::<VendorAssignmentRequest>(), filter, now, aging);
            Page::from_sorted(ordered, page).map(|r| QueuedRequest::at(r.clone(), now, aging))
        })
    }

    /// Fetches a request.
    pub fn get(&self, id: RequestId) -> Result<VendorAssignmentRequest> {
        self.store
            .read(|t| t.require::<VendorAssignmentRequest>(id).cloned())?
    }

    /// Requests of one subscription, newest first.
    pub fn history(&self, subscription: SubscriptionId) -> Result<Vec<VendorAssignmentRequest>> {
        self.store.read(|t| {
            let mut requests: Vec<_> = t
                .iter::<VendorAssignmentRequest>()
                .filter(|r| r.subscription == subscription)
                .cloned()
                .collect();
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            requests
        })
    }

    /// Queue statistics.
    pub fn stats(&self) -> Result<QueueStats> {
        let now = Utc::now();
        self.store.read(|t| {
            queue::stats(
                t.iter::<VendorAssignmentRequest>(),
                now,
                self.settings.priority_aging_hours,
            )
        })
    }
}

fn ensure_no_pending(tx: &Transaction<'_>, subscription: SubscriptionId) -> Result<()> {
    let pending = tx
        .tables()
        .find::<VendorAssignmentRequest, _>(|r| r.subscription == subscription && r.is_pending());
    match pending {
        Some(r) => Err(Error::conflict(format!(
            "subscription {subscription} already has pending request {}",
            r.id
        ))),
        None => Ok(()),
    }
}

/// Creates the initial assignment request for a vendor-less subscription.
pub(crate) fn open_initial_request(
    tx: &mut Transaction<'_>,
    sub: &UserSubscription,
) -> Result<VendorAssignmentRequest> {
    if sub.vendor.is_some() {
        return Err(Error::conflict(format!(
            "subscription {} already has a vendor",
            sub.id
        )));
    }
    if !sub.status.holds_vendor() {
        return Err(Error::conflict(format!(
            "cannot assign a vendor to a {} subscription",
            sub.status
        )));
    }
    ensure_no_pending(tx, sub.id)?;
    let request = VendorAssignmentRequest::new(
        AssignmentRequestKind::InitialAssignment,
        sub.user,
        sub.id,
        sub.delivery.zone,
    );
    tx.insert(request.clone())?;
    tracing::info!(request = %request.id, subscription = %sub.id, "Initial assignment requested");
    Ok(request)
}

/// Cancels every pending request of a subscription. Returns how many.
pub(crate) fn cancel_pending_for(
    tx: &mut Transaction<'_>,
    subscription: SubscriptionId,
    note: &str,
) -> Result<usize> {
    let pending: Vec<RequestId> = tx
        .tables()
        .iter::<VendorAssignmentRequest>()
        .filter(|r| r.subscription == subscription && r.is_pending())
        .map(|r| r.id)
        .collect();
    for id in &pending {
        tx.update::<VendorAssignmentRequest, _, _>(*id, |r| {
            r.cancel("system", Some(note.to_string()))
        })?;
    }
    Ok(pending.len())
}

fn approve_in(
    tx: &mut Transaction<'_>,
    id: RequestId,
    vendor: Option<VendorId>,
    processed_by: &str,
    notes: Option<String>,
    min_rating: f64,
) -> Result<VendorAssignmentRequest> {
    let request = tx.require::<VendorAssignmentRequest>(id)?.clone();
    if !request.is_pending() {
        return Err(Error::transition(
            "assignment request",
            request.status,
            AssignmentStatus::Approved,
        ));
    }
    let sub = tx.require::<UserSubscription>(request.subscription)?.clone();
    if !sub.status.holds_vendor() {
        return Err(Error::conflict(format!(
            "subscription {} is {}",
            sub.id, sub.status
        )));
    }
    match request.kind {
        AssignmentRequestKind::InitialAssignment if sub.vendor.is_some() => {
            return Err(Error::conflict(format!(
                "subscription {} already has a vendor",
                sub.id
            )));
        }
        AssignmentRequestKind::VendorSwitch if sub.vendor.is_none() => {
            return Err(Error::conflict(format!(
                "subscription {} has no vendor to switch from",
                sub.id
            )));
        }
        AssignmentRequestKind::VendorSwitch if sub.vendor_switches_remaining == 0 => {
            return Err(Error::conflict(format!(
                "subscription {} has no vendor switches remaining",
                sub.id
            )));
        }
        _ => {}
    }

    let criteria = MatchCriteria::for_request(tx.tables(), &request, min_rating)?;
    let chosen = match vendor {
        Some(explicit) => {
            let profile = tx.require::<VendorProfile>(explicit)?;
            criteria
                .check(profile)
                .map_err(|why| why.into_error(explicit))?;
            explicit
        }
        None => {
            let preferred = request
                .requested_vendor
                .and_then(|v| tx.get::<VendorProfile>(v))
                .filter(|v| criteria.check(v).is_ok());
            preferred
                .or_else(|| criteria.best(tx.tables().iter::<VendorProfile>()))
                .map(|v| v.id)
                .ok_or_else(|| Error::NoEligibleVendor {
                    request: id.to_string(),
                })?
        }
    };

    tx.update::<VendorProfile, _, _>(chosen, |v| {
        if !v.capacity.reserve() {
            return Err(Error::CapacityExhausted {
                vendor: chosen.to_string(),
            });
        }
        v.touch();
        Ok(())
    })?;
    if let Some(previous) = sub.vendor
        && tx.get::<VendorProfile>(previous).is_some()
    {
        tx.update::<VendorProfile, _, _>(previous, |v| {
            v.capacity.release();
            v.touch();
            Ok(())
        })?;
    }
    tx.update::<UserSubscription, _, _>(sub.id, |s| match request.kind {
        AssignmentRequestKind::InitialAssignment => {
            s.vendor = Some(chosen);
            s.touch();
            Ok(())
        }
        AssignmentRequestKind::VendorSwitch => s.apply_switch(chosen, id),
    })?;
    let approved = tx.update::<VendorAssignmentRequest, _, _>(id, |r| {
        r.approve(chosen, processed_by, notes)?;
        Ok(r.clone())
    })?;

    tracing::info!(
        request = %id,
        subscription = %sub.id,
        kind = %request.kind,
        vendor = %chosen,
        previous = ?sub.vendor,
        processed_by,
        "Assignment request approved"
    );
    Ok(approved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Days;
    use tiffin_core::{
        DeliveryDetails, FoodType, MealType, Money, PriceBreakdown, SubscriptionPlan,
        SubscriptionStatus, VendorCategory, ZoneId,
    };

    struct Fixture {
        service: AssignmentService,
        store: Store,
        zone: ZoneId,
        plan: SubscriptionPlan,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Store::in_memory();
            let mut plan = SubscriptionPlan::new(
                "Veg monthly",
                FoodType::Veg,
                [MealType::Lunch],
                30,
                30,
                Money::from_minor(300_000),
            );
            plan.vendor_switches_allowed = 1;
            store.write(|tx| tx.insert(plan.clone())).unwrap();
            Self {
                service: AssignmentService::new(store.clone(), AssignmentConfig::default()),
                store,
                zone: ZoneId::new(),
                plan,
            }
        }

        fn vendor(&self, name: &str, capacity: u32) -> VendorId {
            let mut v = VendorProfile::new(
                UserId::new(),
                name,
                VendorCategory::HomeChef,
                FoodType::Veg,
                capacity,
            );
            v.is_verified = true;
            v.zones.insert(self.zone);
            self.store.write(|tx| tx.insert(v)).unwrap()
        }

        fn subscription(&self) -> UserSubscription {
            let now = Utc::now();
            let today = now.date_naive();
            let sub = UserSubscription {
                id: SubscriptionId::new(),
                user: UserId::new(),
                plan: self.plan.id,
                status: SubscriptionStatus::Active,
                vendor: None,
                credits_total: 30,
                credits_used: 0,
                vendor_switches_remaining: self.plan.vendor_switches_allowed,
                delivery: DeliveryDetails {
                    address: "1 Residency Road".into(),
                    pincode: "560025".into(),
                    zone: self.zone,
                    meal_types: [MealType::Lunch].into_iter().collect(),
                    instructions: None,
                },
                start_date: today,
                end_date: today + Days::new(29),
                price: PriceBreakdown::default(),
                promo_code: None,
                switch_history: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.store.write(|tx| tx.insert(sub.clone())).unwrap();
            sub
        }

        fn vendor_load(&self, id: VendorId) -> u32 {
            self.store
                .read(|t| t.vendors[&id].capacity.current_subscribers)
                .unwrap()
        }

        fn sub(&self, id: SubscriptionId) -> UserSubscription {
            self.store.read(|t| t.subscriptions[&id].clone()).unwrap()
        }
    }

    #[test]
    fn test_initial_then_switch() {
        let fx = Fixture::new();
        let first = fx.vendor("First", 5);
        let second = fx.vendor("Second", 5);
        let sub = fx.subscription();

        let initial = fx.service.request_initial_assignment(sub.id).unwrap();
        fx.service
            .approve(initial.id, Some(first), "admin", None)
            .unwrap();
        assert_eq!(fx.sub(sub.id).vendor, Some(first));
        assert_eq!(fx.vendor_load(first), 1);

        let switch = fx
            .service
            .request_switch(SwitchInput {
                subscription: sub.id,
                user: sub.user,
                requested_vendor: Some(second),
                reason: Some("too spicy".into()),
                priority: Some(Priority::High),
            })
            .unwrap();
        assert_eq!(switch.current_vendor, Some(first));

        let approved = fx.service.approve(switch.id, None, "admin", None).unwrap();
        assert_eq!(approved.assigned_vendor, Some(second));
        let after = fx.sub(sub.id);
        assert_eq!(after.vendor, Some(second));
        assert_eq!(after.vendor_switches_remaining, 0);
        assert_eq!(after.switch_history.len(), 1);
        assert_eq!(fx.vendor_load(first), 0);
        assert_eq!(fx.vendor_load(second), 1);
    }

    #[test]
    fn test_second_approval_changes_nothing() {
        let fx = Fixture::new();
        let vendor = fx.vendor("Only", 5);
        let sub = fx.subscription();
        let request = fx.service.request_initial_assignment(sub.id).unwrap();

        fx.service.approve(request.id, None, "admin", None).unwrap();
        let err = fx
            .service
            .approve(request.id, None, "admin", None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(fx.vendor_load(vendor), 1);
    }

    #[test]
    fn test_full_vendor_rejected_without_side_effects() {
        let fx = Fixture::new();
        let full = fx.vendor("Full", 1);
        let a = fx.subscription();
        let b = fx.subscription();
        let ra = fx.service.request_initial_assignment(a.id).unwrap();
        let rb = fx.service.request_initial_assignment(b.id).unwrap();

        fx.service.approve(ra.id, Some(full), "admin", None).unwrap();
        let err = fx
            .service
            .approve(rb.id, Some(full), "admin", None)
            .unwrap_err();
        assert!(matches!(err, Error::CapacityExhausted { .. }));
        assert_eq!(fx.sub(b.id).vendor, None);
        assert!(fx.service.get(rb.id).unwrap().is_pending());
    }

    #[test]
    fn test_no_eligible_vendor() {
        let fx = Fixture::new();
        let sub = fx.subscription();
        let request = fx.service.request_initial_assignment(sub.id).unwrap();
        let err = fx
            .service
            .approve(request.id, None, "admin", None)
            .unwrap_err();
        assert!(matches!(err, Error::NoEligibleVendor { .. }));
    }

    #[test]
    fn test_one_pending_request_per_subscription() {
        let fx = Fixture::new();
        let sub = fx.subscription();
        fx.service.request_initial_assignment(sub.id).unwrap();
        let err = fx.service.request_initial_assignment(sub.id).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[test]
    fn test_switch_preconditions() {
        let fx = Fixture::new();
        let vendor = fx.vendor("Current", 5);
        let sub = fx.subscription();
        let input = |user| SwitchInput {
            subscription: sub.id,
            user,
            requested_vendor: None,
            reason: None,
            priority: None,
        };

        // No vendor yet.
        assert!(fx.service.request_switch(input(sub.user)).is_err());

        let initial = fx.service.request_initial_assignment(sub.id).unwrap();
        fx.service
            .approve(initial.id, Some(vendor), "admin", None)
            .unwrap();

        // Someone else's subscription.
        assert!(fx.service.request_switch(input(UserId::new())).is_err());

        // Same vendor requested.
        let mut same = input(sub.user);
        same.requested_vendor = Some(vendor);
        assert!(matches!(
            fx.service.request_switch(same),
            Err(Error::Validation { .. })
        ));

        fx.service.request_switch(input(sub.user)).unwrap();
        assert!(fx.service.request_switch(input(sub.user)).is_err());
    }

    #[test]
    fn test_reject_requires_reason_and_cancel_requires_owner() {
        let fx = Fixture::new();
        let sub = fx.subscription();
        let request = fx.service.request_initial_assignment(sub.id).unwrap();

        assert!(fx.service.reject(request.id, "admin", "  ").is_err());
        assert!(fx.service.cancel(request.id, UserId::new()).is_err());

        let cancelled = fx.service.cancel(request.id, sub.user).unwrap();
        assert_eq!(cancelled.status, AssignmentStatus::Cancelled);
        assert!(fx.service.reject(request.id, "admin", "late").is_err());
    }

    #[test]
    fn test_auto_assign_spreads_and_reports() {
        let fx = Fixture::new();
        let small = fx.vendor("Small", 1);
        let subs: Vec<_> = (0..3).map(|_| fx.subscription()).collect();
        for sub in &subs {
            fx.service.request_initial_assignment(sub.id).unwrap();
        }

        let report = fx.service.auto_assign(None, "scheduler").unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.assigned.len(), 1);
        assert_eq!(report.assigned[0].vendor, small);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(fx.vendor_load(small), 1);

        let big = fx.vendor("Big", 10);
        let report = fx.service.auto_assign(Some(1), "scheduler").unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.assigned[0].vendor, big);
    }

    #[test]
    fn test_candidates_exclude_current_vendor() {
        let fx = Fixture::new();
        let a = fx.vendor("A", 5);
        let b = fx.vendor("B", 5);
        let sub = fx.subscription();
        let initial = fx.service.request_initial_assignment(sub.id).unwrap();
        assert_eq!(fx.service.candidates(initial.id, None, 10).unwrap().len(), 2);

        fx.service.approve(initial.id, Some(a), "admin", None).unwrap();
        let switch = fx
            .service
            .request_switch(SwitchInput {
                subscription: sub.id,
                user: sub.user,
                requested_vendor: None,
                reason: None,
                priority: None,
            })
            .unwrap();
        let candidates = fx.service.candidates(switch.id, None, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].vendor, b);
    }

    #[test]
    fn test_queue_and_history() {
        let fx = Fixture::new();
        let sub = fx.subscription();
        let request = fx.service.request_initial_assignment(sub.id).unwrap();
        let page = fx
            .service
            .queue(&QueueFilter::default(), PageRequest::default())
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].request.id, request.id);
        assert_eq!(page.items[0].effective_priority, Priority::Normal);
        assert_eq!(fx.service.history(sub.id).unwrap().len(), 1);
        assert_eq!(fx.service.stats().unwrap().by_status["pending"], 1);
    }
}

//! Integration tests for the vendor assignment workflow.

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use tiffin_core::{
    AssignmentRequestKind, AssignmentStatus, Error, FoodType, MealType, PageRequest, Priority,
};
use tiffin_engine::assignment::{QueueFilter, SwitchInput};
use tiffin_engine::orders::NewOrder;

use crate::common::TestHarness;

#[test]
fn test_purchase_assign_order_switch() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let first = harness.vendor("Amma Kitchen", FoodType::Veg, 10);
    let second = harness.vendor("Ghar Ka Khana", FoodType::Both, 10);
    let plan = harness.plan(FoodType::Veg, 20, 1);
    let user = harness.user("Meera");

    let receipt = harness.purchase(user, plan);
    let sub = receipt.subscription.id;
    assert_eq!(receipt.assignment.kind, AssignmentRequestKind::InitialAssignment);

    let approved = engine
        .assignments()
        .approve(receipt.assignment.id, Some(first), "ops@tiffin", None)
        .unwrap();
    assert_eq!(approved.status, AssignmentStatus::Approved);
    assert_eq!(engine.vendors().get(first).unwrap().capacity.current_subscribers, 1);

    let order = engine
        .orders()
        .place(NewOrder {
            subscription: sub,
            meal_type: MealType::Lunch,
            delivery_date: Utc::now().date_naive(),
        })
        .unwrap();
    assert_eq!(order.vendor, first);

    let switch = engine
        .assignments()
        .request_switch(SwitchInput {
            subscription: sub,
            user,
            requested_vendor: Some(second),
            reason: Some("Want variety".into()),
            priority: None,
        })
        .unwrap();
    engine
        .assignments()
        .approve(switch.id, None, "ops@tiffin", Some("requested vendor".into()))
        .unwrap();

    let after = engine.subscriptions().get(sub).unwrap();
    assert_eq!(after.vendor, Some(second));
    assert_eq!(after.vendor_switches_remaining, 0);
    assert_eq!(after.switch_history[0].from, first);
    assert_eq!(engine.vendors().get(first).unwrap().capacity.current_subscribers, 0);
    assert_eq!(engine.vendors().get(second).unwrap().capacity.current_subscribers, 1);

    // Allowance spent.
    let err = engine
        .assignments()
        .request_switch(SwitchInput {
            subscription: sub,
            user,
            requested_vendor: None,
            reason: None,
            priority: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));
    assert_eq!(engine.assignments().history(sub).unwrap().len(), 2);
}

#[test]
fn test_food_type_respected_by_matching() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    harness.vendor("Veg Only", FoodType::Veg, 10);
    let meat = harness.vendor("Biryani House", FoodType::NonVeg, 10);
    let plan = harness.plan(FoodType::NonVeg, 10, 0);
    let receipt = harness.purchase(harness.user("Kabir"), plan);

    let candidates = engine
        .assignments()
        .candidates(receipt.assignment.id, None, 10)
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].vendor, meat);

    let report = engine.assignments().auto_assign(None, "scheduler").unwrap();
    assert_eq!(report.assigned.len(), 1);
    assert_eq!(report.assigned[0].vendor, meat);
}

#[test]
fn test_queue_orders_by_priority_then_kind() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let vendor = harness.vendor("Annapurna", FoodType::Both, 50);
    let plan = harness.plan(FoodType::Veg, 10, 2);

    let switcher = harness.user("Tara");
    let switched = harness.purchase(switcher, plan);
    engine
        .assignments()
        .approve(switched.assignment.id, Some(vendor), "ops", None)
        .unwrap();
    let urgent = engine
        .assignments()
        .request_switch(SwitchInput {
            subscription: switched.subscription.id,
            user: switcher,
            requested_vendor: None,
            reason: Some("Late deliveries".into()),
            priority: Some(Priority::Urgent),
        })
        .unwrap();
    let waiting = harness.purchase(harness.user("Dev"), plan);

    let queue = engine
        .assignments()
        .queue(&QueueFilter::default(), PageRequest::default())
        .unwrap();
    let ids: Vec<_> = queue.items.iter().map(|q| q.request.id).collect();
    assert_eq!(ids, vec![urgent.id, waiting.assignment.id]);

    let only_switches = QueueFilter {
        kind: Some(AssignmentRequestKind::VendorSwitch),
        ..QueueFilter::default()
    };
    let queue = engine
        .assignments()
        .queue(&only_switches, PageRequest::default())
        .unwrap();
    assert_eq!(queue.total, 1);

    let stats = engine.assignments().stats().unwrap();
    assert_eq!(stats.pending_by_kind["vendor_switch"], 1);
    assert_eq!(stats.pending_by_kind["initial_assignment"], 1);
}

#[test]
fn test_concurrent_approvals_never_overbook() {
    let harness = Arc::new(TestHarness::new());
    let vendor = harness.vendor("Small Batch", FoodType::Veg, 3);
    let plan = harness.plan(FoodType::Veg, 10, 0);
    let requests: Vec<_> = (0..8)
        .map(|i| {
            harness
                .purchase(harness.user(&format!("eater{i}")), plan)
                .assignment
                .id
        })
        .collect();

    let handles: Vec<_> = requests
        .into_iter()
        .map(|id| {
            let harness = Arc::clone(&harness);
            thread::spawn(move || {
                harness
                    .engine
                    .assignments()
                    .approve(id, Some(vendor), "ops", None)
                    .is_ok()
            })
        })
        .collect();
    let approved = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(approved, 3);
    let profile = harness.engine.vendors().get(vendor).unwrap();
    assert_eq!(profile.capacity.current_subscribers, 3);
    let stats = harness.engine.assignments().stats().unwrap();
    assert_eq!(stats.by_status["pending"], 5);
}

#[test]
fn test_subscription_cancel_withdraws_pending_switch() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let vendor = harness.vendor("Home Meals", FoodType::Veg, 5);
    harness.vendor("Other Meals", FoodType::Veg, 5);
    let plan = harness.plan(FoodType::Veg, 10, 1);
    let user = harness.user("Nila");
    let receipt = harness.purchase(user, plan);
    engine
        .assignments()
        .approve(receipt.assignment.id, Some(vendor), "ops", None)
        .unwrap();
    let switch = engine
        .assignments()
        .request_switch(SwitchInput {
            subscription: receipt.subscription.id,
            user,
            requested_vendor: None,
            reason: None,
            priority: None,
        })
        .unwrap();

    engine.subscriptions().cancel(receipt.subscription.id).unwrap();
    assert_eq!(
        engine.assignments().get(switch.id).unwrap().status,
        AssignmentStatus::Cancelled
    );
    assert_eq!(engine.vendors().get(vendor).unwrap().capacity.current_subscribers, 0);
    assert!(
        engine
            .assignments()
            .approve(switch.id, None, "ops", None)
            .is_err()
    );
}

//! Integration tests for state surviving a restart.

use tiffin_core::{AssignmentStatus, FoodType, TiffinConfig};
use tiffin_engine::Engine;
use tiffin_store::{JsonFileSnapshots, Store};

use crate::common::TestHarness;

#[test]
fn test_workflow_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiffin.json");

    let (sub, request, vendor) = {
        let store = Store::open(JsonFileSnapshots::new(&path)).unwrap();
        let harness = TestHarness::with_store(store);
        let vendor = harness.vendor("Persistent Pots", FoodType::Veg, 4);
        let plan = harness.plan(FoodType::Veg, 10, 0);
        let receipt = harness.purchase(harness.user("Rhea"), plan);
        harness
            .engine
            .assignments()
            .approve(receipt.assignment.id, None, "ops", None)
            .unwrap();
        (receipt.subscription.id, receipt.assignment.id, vendor)
    };

    let store = Store::open(JsonFileSnapshots::new(&path)).unwrap();
    let engine = Engine::new(store, &TiffinConfig::default());
    let subscription = engine.subscriptions().get(sub).unwrap();
    assert_eq!(subscription.vendor, Some(vendor));
    assert_eq!(
        engine.assignments().get(request).unwrap().status,
        AssignmentStatus::Approved
    );
    assert_eq!(engine.vendors().get(vendor).unwrap().capacity.current_subscribers, 1);
}

#[test]
fn test_failed_operation_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiffin.json");
    let store = Store::open(JsonFileSnapshots::new(&path)).unwrap();
    let harness = TestHarness::with_store(store);
    let plan = harness.plan(FoodType::Veg, 10, 0);
    let before = std::fs::read_to_string(&path).unwrap();

    let mut input = crate::common::purchase_input(harness.user("Ghost"), plan);
    let after_user = std::fs::read_to_string(&path).unwrap();
    assert_ne!(before, after_user);
    input.delivery.pincode = "110001".into();
    assert!(harness.engine.subscriptions().purchase(input).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_user);
}

//! Integration tests for purchases, referrals, promos and orders.

use chrono::{Days, Utc};
use tiffin_core::config::ReferralConfig;
use tiffin_core::{Discount, Error, FoodType, MealType, Money, OrderStatus, SubscriptionStatus};
use tiffin_engine::orders::NewOrder;
use tiffin_engine::promos::NewPromo;
use tiffin_engine::reviews::NewReview;
use tiffin_engine::subscriptions::Purchase;

use crate::common::{TestHarness, purchase_input};

#[test]
fn test_referral_paid_on_first_purchase_only() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let plan = harness.plan(FoodType::Veg, 10, 0);
    let referrer = harness.user("Lakshmi");
    let code = engine.users().get(referrer).unwrap().referral_code;
    let referee = harness.referred_user("Arjun", Some(&code.to_lowercase()));

    let first = harness.purchase(referee, plan);
    assert!(first.referral_rewarded);
    let second = harness.purchase(referee, plan);
    assert!(!second.referral_rewarded);

    let rewards = ReferralConfig::default();
    assert_eq!(
        engine.users().get(referrer).unwrap().wallet_balance,
        rewards.referrer_reward
    );
    assert_eq!(
        engine.users().get(referee).unwrap().wallet_balance,
        rewards.referee_reward
    );
    let summary = engine.users().referral_summary(referrer).unwrap();
    assert_eq!(summary.rewarded, 1);
    assert_eq!(summary.total_earned, rewards.referrer_reward);
}

#[test]
fn test_promo_discount_and_limits() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let plan = harness.plan(FoodType::Veg, 10, 0);
    engine
        .promos()
        .create(NewPromo {
            code: "monsoon20".into(),
            description: "20% off, capped".into(),
            discount: Discount::Percentage {
                percent: 20,
                max_discount: Some(Money::from_minor(40_000)),
            },
            min_order_amount: Money::from_minor(100_000),
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            per_user_limit: Some(1),
            applicable_plans: [plan].into_iter().collect(),
        })
        .unwrap();
    let user = harness.user("Farah");

    let quote = engine
        .promos()
        .quote("MONSOON20", user, Some(plan), Money::from_minor(250_000), Utc::now())
        .unwrap();
    assert_eq!(quote.discount, Money::from_minor(40_000));

    let input = Purchase {
        promo_code: Some("Monsoon20".into()),
        ..purchase_input(user, plan)
    };
    let receipt = engine.subscriptions().purchase(input.clone()).unwrap();
    let price = receipt.subscription.price;
    assert_eq!(price.discount, Money::from_minor(40_000));
    assert_eq!(price.delivery_fee, Money::from_minor(3_000));
    assert_eq!(price.total, Money::from_minor(213_000));

    let err = engine.subscriptions().purchase(input).unwrap_err();
    assert!(matches!(err, Error::PromoRejected { reason, .. } if reason == "per-user limit reached"));
}

#[test]
fn test_purchase_from_json_body() {
    let harness = TestHarness::new();
    let plan = harness.plan(FoodType::Veg, 10, 0);
    let user = harness.user("Zoya");
    let body = serde_json::json!({
        "user": user,
        "plan": plan,
        "delivery": {
            "address": "12th Main",
            "pincode": "560038",
            "meal_types": ["lunch"]
        }
    });
    let input: Purchase = serde_json::from_value(body).unwrap();
    let receipt = harness.engine.subscriptions().purchase(input).unwrap();
    assert_eq!(receipt.subscription.user, user);
}

#[test]
fn test_credits_run_out_then_review() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let vendor = harness.vendor("Two Meals", FoodType::Veg, 5);
    let plan = harness.plan(FoodType::Veg, 2, 0);
    let user = harness.user("Ishaan");
    let receipt = harness.purchase(user, plan);
    let sub = receipt.subscription.id;
    engine
        .assignments()
        .approve(receipt.assignment.id, None, "ops", None)
        .unwrap();

    let today = Utc::now().date_naive();
    let order = |days| NewOrder {
        subscription: sub,
        meal_type: MealType::Lunch,
        delivery_date: today + Days::new(days),
    };
    let first = engine.orders().place(order(0)).unwrap();
    engine.orders().place(order(1)).unwrap();
    assert_eq!(
        engine.subscriptions().get(sub).unwrap().status,
        SubscriptionStatus::Expired
    );
    assert_eq!(engine.vendors().get(vendor).unwrap().capacity.current_subscribers, 0);
    assert!(engine.orders().place(order(2)).is_err());

    // Reviews need a delivered order.
    let review = NewReview {
        user,
        vendor,
        order: Some(first.id),
        rating: 5,
        comment: None,
    };
    assert!(engine.reviews().submit(review.clone()).is_err());
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ] {
        engine.orders().advance(first.id, status).unwrap();
    }
    engine.reviews().submit(review).unwrap();
    let rating = engine.vendors().get(vendor).unwrap().rating;
    assert_eq!((rating.count, rating.average), (1, 5.0));
}

#[test]
fn test_expire_due_releases_capacity() {
    let harness = TestHarness::new();
    let engine = &harness.engine;
    let vendor = harness.vendor("Weekly", FoodType::Veg, 5);
    let plan = harness.plan(FoodType::Veg, 30, 0);
    let receipt = harness.purchase(harness.user("Omar"), plan);
    engine
        .assignments()
        .approve(receipt.assignment.id, Some(vendor), "ops", None)
        .unwrap();

    let after_end = receipt.subscription.end_date + Days::new(1);
    let expired = engine.subscriptions().expire_due(after_end).unwrap();
    assert_eq!(expired, vec![receipt.subscription.id]);
    assert_eq!(engine.vendors().get(vendor).unwrap().capacity.current_subscribers, 0);
    assert!(engine.subscriptions().expire_due(after_end).unwrap().is_empty());
}

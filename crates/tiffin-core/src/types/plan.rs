//! Subscription plans offered for purchase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{FoodType, MealType, Money, PlanId};

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Unique identifier
    pub id: PlanId,
    /// Plan name (e.g. "Monthly Veg Lunch")
    pub name: String,
    /// Marketing description
    pub description: String,
    /// Dietary category the plan requires of its vendor
    pub food_type: FoodType,
    /// Meal slots the plan covers
    pub meal_types: BTreeSet<MealType>,
    /// Validity in days from the start date
    pub duration_days: u32,
    /// Meal credits granted at purchase
    pub total_credits: u32,
    /// Price before discounts and delivery
    pub price: Money,
    /// Vendor switches a subscriber may request
    pub vendor_switches_allowed: u32,
    /// Only active plans can be purchased
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// Creates an active plan.
    pub fn new(
        name: impl Into<String>,
        food_type: FoodType,
        meal_types: impl IntoIterator<Item = MealType>,
        duration_days: u32,
        total_credits: u32,
        price: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PlanId::new(),
            name: name.into(),
            description: String::new(),
            food_type,
            meal_types: meal_types.into_iter().collect(),
            duration_days,
            total_credits,
            price,
            vendor_switches_allowed: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

//! Subscription plans.

use serde::Deserialize;
use std::collections::BTreeSet;

use tiffin_core::{Error, FoodType, MealType, Money, Page, PageRequest, PlanId, Result, SubscriptionPlan};
use tiffin_store::Store;

use crate::validate;

/// Input for creating a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    /// Display name
    pub name: String,
    /// Marketing description
    #[serde(default)]
    pub description: String,
    /// Food type served
    pub food_type: FoodType,
    /// Meal slots included
    pub meal_types: BTreeSet<MealType>,
    /// Length in days
    pub duration_days: u32,
    /// Meal credits granted
    pub total_credits: u32,
    /// Price
    pub price: Money,
    /// Vendor switches allowed over the plan's life
    #[serde(default)]
    pub vendor_switches_allowed: u32,
}

/// Partial update of a plan. Existing subscriptions are unaffected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New price
    pub price: Option<Money>,
    /// New switch allowance
    pub vendor_switches_allowed: Option<u32>,
    /// Offer or withdraw the plan
    pub is_active: Option<bool>,
}

/// Plan management.
#[derive(Clone, Debug)]
pub struct PlanService {
    store: Store,
}

impl PlanService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates an active plan.
    pub fn create(&self, input: NewPlan) -> Result<SubscriptionPlan> {
        let name = validate::non_empty("name", &input.name)?;
        let duration = validate::positive("duration_days", input.duration_days)?;
        let credits = validate::positive("total_credits", input.total_credits)?;
        if input.meal_types.is_empty() {
            return Err(Error::validation_field(
                "meal_types",
                "at least one meal type is required",
            ));
        }
        if input.price.is_zero() {
            return Err(Error::validation_field("price", "must be greater than zero"));
        }

        let mut plan = SubscriptionPlan::new(
            name,
            input.food_type,
            input.meal_types,
            duration,
            credits,
            input.price,
        );
        plan.description = input.description.trim().to_string();
        plan.vendor_switches_allowed = input.vendor_switches_allowed;

        self.store.write(|tx| {
            tx.insert(plan.clone())?;
            tracing::info!(plan = %plan.id, name = %plan.name, "Plan created");
            Ok(plan)
        })
    }

    /// Applies a partial update.
    pub fn update(&self, id: PlanId, update: PlanUpdate) -> Result<SubscriptionPlan> {
        let name = update
            .name
            .as_deref()
            .map(|n| validate::non_empty("name", n))
            .transpose()?;
        if update.price.is_some_and(Money::is_zero) {
            return Err(Error::validation_field("price", "must be greater than zero"));
        }

        self.store.write(|tx| {
            tx.update::<SubscriptionPlan, _, _>(id, |plan| {
                if let Some(name) = name {
                    plan.name = name;
                }
                if let Some(description) = update.description {
                    plan.description = description.trim().to_string();
                }
                if let Some(price) = update.price {
                    plan.price = price;
                }
                if let Some(switches) = update.vendor_switches_allowed {
                    plan.vendor_switches_allowed = switches;
                }
                if let Some(active) = update.is_active {
                    plan.is_active = active;
                }
                plan.updated_at = chrono::Utc::now();
                Ok(plan.clone())
            })
        })
    }

    /// Fetches a plan.
    pub fn get(&self, id: PlanId) -> Result<SubscriptionPlan> {
        self.store.read(|t| t.require::<SubscriptionPlan>(id).cloned())?
    }

    /// Lists plans, cheapest first.
    pub fn list(
        &self,
        active_only: bool,
        food_type: Option<FoodType>,
        page: PageRequest,
    ) -> Result<Page<SubscriptionPlan>> {
        self.store.read(|t| {
            t.page(
                |p: &SubscriptionPlan| {
                    (!active_only || p.is_active) && food_type.is_none_or(|f| p.food_type == f)
                },
                |a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)),
                page,
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_plan(name: &str, price: u64) -> NewPlan {
        NewPlan {
            name: name.into(),
            description: String::new(),
            food_type: FoodType::Veg,
            meal_types: [MealType::Lunch, MealType::Dinner].into_iter().collect(),
            duration_days: 30,
            total_credits: 60,
            price: Money::from_minor(price),
            vendor_switches_allowed: 2,
        }
    }

    #[test]
    fn test_create_validates() {
        let plans = PlanService::new(Store::in_memory());
        let mut bad = new_plan("Monthly", 300_000);
        bad.meal_types.clear();
        assert!(plans.create(bad).is_err());

        let mut bad = new_plan("Monthly", 300_000);
        bad.total_credits = 0;
        assert!(plans.create(bad).is_err());

        let plan = plans.create(new_plan("Monthly", 300_000)).unwrap();
        assert_eq!(plan.vendor_switches_allowed, 2);
        assert!(plan.is_active);
    }

    #[test]
    fn test_list_active_cheapest_first() {
        let plans = PlanService::new(Store::in_memory());
        let premium = plans.create(new_plan("Premium", 500_000)).unwrap();
        plans.create(new_plan("Basic", 200_000)).unwrap();
        plans
            .update(
                premium.id,
                PlanUpdate {
                    is_active: Some(false),
                    ..PlanUpdate::default()
                },
            )
            .unwrap();

        let all = plans.list(false, None, PageRequest::default()).unwrap();
        assert_eq!(all.items[0].name, "Basic");
        assert_eq!(all.total, 2);
        let active = plans.list(true, None, PageRequest::default()).unwrap();
        assert_eq!(active.total, 1);
    }
}

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Modules
//!
//! - [`assignment`]: Vendor assignment queue, matching and resolution
//! - [`subscriptions`]: Purchase and lifecycle of user subscriptions
//! - [`orders`]: Meal orders
//! - [`zones`], [`vendors`], [`plans`], [`menus`]: Catalog management
//! - [`promos`]: Promo code management and quoting
//! - [`reviews`]: Vendor reviews and rating aggregates
//! - [`users`]: Registration and referrals

pub mod assignment;
pub mod menus;
pub mod orders;
pub mod plans;
pub mod promos;
pub mod reviews;
pub mod subscriptions;
pub mod users;
pub mod vendors;
pub mod zones;

mod validate;

use tiffin_core::TiffinConfig;
use tiffin_store::Store;

pub use assignment::AssignmentService;
pub use menus::MenuService;
pub use orders::OrderService;
pub use plans::PlanService;
pub use promos::PromoService;
pub use reviews::ReviewService;
pub use subscriptions::SubscriptionService;
pub use users::UserService;
pub use vendors::VendorService;
pub use zones::ZoneService;

// Re-export core types
pub use tiffin_core::{Error, Result};

/// All workflow services over one store.
#[derive(Clone, Debug)]
pub struct Engine {
    store: Store,
    assignments: AssignmentService,
    subscriptions: SubscriptionService,
    orders: OrderService,
    zones: ZoneService,
    vendors: VendorService,
    plans: PlanService,
    menus: MenuService,
    promos: PromoService,
    reviews: ReviewService,
    users: UserService,
}

impl Engine {
    /// Builds every service against `store`.
    pub fn new(store: Store, config: &TiffinConfig) -> Self {
        Self {
            assignments: AssignmentService::new(store.clone(), config.assignment.clone()),
            subscriptions: SubscriptionService::new(store.clone(), config.referral.clone()),
            orders: OrderService::new(store.clone()),
            zones: ZoneService::new(store.clone()),
            vendors: VendorService::new(store.clone()),
            plans: PlanService::new(store.clone()),
            menus: MenuService::new(store.clone()),
            promos: PromoService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Vendor assignment workflow.
    pub fn assignments(&self) -> &AssignmentService {
        &self.assignments
    }

    /// Subscription workflow.
    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.subscriptions
    }

    /// Order workflow.
    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    /// Location zones.
    pub fn zones(&self) -> &ZoneService {
        &self.zones
    }

    /// Vendor profiles.
    pub fn vendors(&self) -> &VendorService {
        &self.vendors
    }

    /// Subscription plans.
    pub fn plans(&self) -> &PlanService {
        &self.plans
    }

    /// Vendor menus.
    pub fn menus(&self) -> &MenuService {
        &self.menus
    }

    /// Promo codes.
    pub fn promos(&self) -> &PromoService {
        &self.promos
    }

    /// Reviews.
    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    /// Users and referrals.
    pub fn users(&self) -> &UserService {
        &self.users
    }
}

//! Common test utilities and harness for engine integration tests.

use tiffin_core::{
    FoodType, MealType, Money, PlanId, TiffinConfig, UserId, VendorCategory, VendorId, ZoneId,
};
use tiffin_engine::Engine;
use tiffin_engine::plans::NewPlan;
use tiffin_engine::subscriptions::{DeliveryInput, Purchase, PurchaseReceipt};
use tiffin_engine::users::NewUser;
use tiffin_engine::vendors::NewVendor;
use tiffin_engine::zones::NewZone;
use tiffin_store::Store;

/// Pincode served by the harness zone.
pub const PINCODE: &str = "560038";

/// Test harness with one zone and helpers to seed the catalog.
pub struct TestHarness {
    /// Engine under test
    pub engine: Engine,
    /// Zone covering [`PINCODE`]
    pub zone: ZoneId,
}

impl TestHarness {
    /// Creates a harness over an in-memory store.
    pub fn new() -> Self {
        Self::with_store(Store::in_memory())
    }

    /// Creates a harness over `store` with default configuration.
    pub fn with_store(store: Store) -> Self {
        Self::with_config(store, &TiffinConfig::default())
    }

    /// Creates a harness over `store` with `config`.
    pub fn with_config(store: Store, config: &TiffinConfig) -> Self {
        let engine = Engine::new(store, config);
        let zone = engine
            .zones()
            .create(NewZone {
                name: "Indiranagar".into(),
                city: "Bengaluru".into(),
                pincodes: vec![PINCODE.into()],
                base_delivery_fee: Money::from_minor(3_000),
                free_delivery_threshold: None,
            })
            .expect("zone should be created")
            .id;
        Self { engine, zone }
    }

    /// Registers a user.
    pub fn user(&self, name: &str) -> UserId {
        self.referred_user(name, None)
    }

    /// Registers a user with someone's referral code.
    pub fn referred_user(&self, name: &str, code: Option<&str>) -> UserId {
        self.engine
            .users()
            .register(NewUser {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: None,
                referral_code: code.map(str::to_string),
            })
            .expect("user should register")
            .id
    }

    /// Registers and verifies a vendor in the harness zone.
    pub fn vendor(&self, name: &str, food_type: FoodType, capacity: u32) -> VendorId {
        let owner = self.user(&format!("owner{}", name.replace(' ', "")));
        let vendor = self
            .engine
            .vendors()
            .register(NewVendor {
                owner,
                business_name: name.into(),
                category: VendorCategory::HomeChef,
                food_type,
                cuisines: vec!["South Indian".into()],
                zones: vec![self.zone],
                max_subscribers: capacity,
            })
            .expect("vendor should register");
        self.engine
            .vendors()
            .verify(vendor.id, true)
            .expect("vendor should verify");
        vendor.id
    }

    /// Creates a lunch plan.
    pub fn plan(&self, food_type: FoodType, credits: u32, switches: u32) -> PlanId {
        self.engine
            .plans()
            .create(NewPlan {
                name: format!("{food_type} lunch x{credits}"),
                description: String::new(),
                food_type,
                meal_types: [MealType::Lunch].into_iter().collect(),
                duration_days: 30,
                total_credits: credits,
                price: Money::from_minor(250_000),
                vendor_switches_allowed: switches,
            })
            .expect("plan should be created")
            .id
    }

    /// Buys `plan` for `user` at the harness pincode.
    pub fn purchase(&self, user: UserId, plan: PlanId) -> PurchaseReceipt {
        self.engine
            .subscriptions()
            .purchase(purchase_input(user, plan))
            .expect("purchase should succeed")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Purchase input for the harness pincode, starting today.
pub fn purchase_input(user: UserId, plan: PlanId) -> Purchase {
    Purchase {
        user,
        plan,
        delivery: DeliveryInput {
            address: "100 Feet Road".into(),
            pincode: PINCODE.into(),
            meal_types: Default::default(),
            instructions: None,
        },
        promo_code: None,
        start_date: None,
    }
}

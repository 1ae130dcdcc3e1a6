//! Vendor profiles: registration, verification and availability.

use serde::Deserialize;
use std::collections::BTreeSet;

use tiffin_core::{
    Error, FoodType, LocationZone, Page, PageRequest, Result, UserAccount, UserId,
    VendorCategory, VendorId, VendorProfile, ZoneId,
};
use tiffin_store::{Store, Transaction};

use crate::validate;

/// Input for registering a vendor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVendor {
    /// Owning user
    pub owner: UserId,
    /// Trading name
    pub business_name: String,
    /// Kitchen kind
    pub category: VendorCategory,
    /// What the vendor cooks
    pub food_type: FoodType,
    /// Cuisines offered
    #[serde(default)]
    pub cuisines: Vec<String>,
    /// Zones served
    pub zones: Vec<ZoneId>,
    /// Maximum concurrent subscribers
    pub max_subscribers: u32,
}

/// Partial update of a vendor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorUpdate {
    /// New trading name
    pub business_name: Option<String>,
    /// New kitchen kind
    pub category: Option<VendorCategory>,
    /// New food type
    pub food_type: Option<FoodType>,
    /// Replacement cuisine list
    pub cuisines: Option<Vec<String>>,
    /// Replacement zone set
    pub zones: Option<Vec<ZoneId>>,
    /// New capacity; may not drop below current subscribers
    pub max_subscribers: Option<u32>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorFilter {
    /// Serving this zone
    pub zone: Option<ZoneId>,
    /// Of this category
    pub category: Option<VendorCategory>,
    /// Able to serve plans of this food type
    pub food_type: Option<FoodType>,
    /// Verification state
    pub verified: Option<bool>,
    /// Only active, accepting vendors with free capacity
    #[serde(default)]
    pub available_only: bool,
}

/// Vendor management.
#[derive(Clone, Debug)]
pub struct VendorService {
    store: Store,
}

impl VendorService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registers an unverified vendor.
    pub fn register(&self, input: NewVendor) -> Result<VendorProfile> {
        let name = validate::non_empty("business_name", &input.business_name)?;
        let max = validate::positive("max_subscribers", input.max_subscribers)?;

        self.store.write(|tx| {
            tx.require::<UserAccount>(input.owner)?;
            if tx
                .tables()
                .find::<VendorProfile, _>(|v| v.owner == input.owner)
                .is_some()
            {
                return Err(Error::conflict(format!(
                    "user {} already owns a vendor profile",
                    input.owner
                )));
            }
            let mut vendor =
                VendorProfile::new(input.owner, name, input.category, input.food_type, max);
            vendor.cuisines = cuisines(input.cuisines);
            vendor.zones = zone_set(tx, &input.zones)?;
            tx.insert(vendor.clone())?;
            tracing::info!(vendor = %vendor.id, name = %vendor.business_name, "Vendor registered");
            Ok(vendor)
        })
    }

    /// Applies a partial update.
    pub fn update(&self, id: VendorId, update: VendorUpdate) -> Result<VendorProfile> {
        let name = update
            .business_name
            .as_deref()
            .map(|n| validate::non_empty("business_name", n))
            .transpose()?;

        self.store.write(|tx| {
            let zones = update.zones.as_deref().map(|z| zone_set(tx, z)).transpose()?;
            tx.update::<VendorProfile, _, _>(id, |vendor| {
                if let Some(name) = name {
                    vendor.business_name = name;
                }
                if let Some(category) = update.category {
                    vendor.category = category;
                }
                if let Some(food_type) = update.food_type {
                    vendor.food_type = food_type;
                }
                if let Some(list) = update.cuisines {
                    vendor.cuisines = cuisines(list);
                }
                if let Some(zones) = zones {
                    vendor.zones = zones;
                }
                if let Some(max) = update.max_subscribers {
                    if max < vendor.capacity.current_subscribers {
                        return Err(Error::validation_field(
                            "max_subscribers",
                            format!(
                                "cannot be below the {} current subscribers",
                                vendor.capacity.current_subscribers
                            ),
                        ));
                    }
                    vendor.capacity.max_subscribers = max;
                }
                vendor.touch();
                Ok(vendor.clone())
            })
        })
    }

    /// Sets the verification flag.
    pub fn verify(&self, id: VendorId, verified: bool) -> Result<VendorProfile> {
        self.set_flags(id, |v| v.is_verified = verified)
            .inspect(|v| tracing::info!(vendor = %v.id, verified, "Vendor verification updated"))
    }

    /// Opens or closes the vendor to new subscribers.
    pub fn set_availability(&self, id: VendorId, accepting: bool) -> Result<VendorProfile> {
        self.set_flags(id, |v| v.is_accepting = accepting)
    }

    /// Disables a vendor. Existing subscriptions keep it until switched.
    pub fn deactivate(&self, id: VendorId) -> Result<VendorProfile> {
        self.set_flags(id, |v| {
            v.is_active = false;
            v.is_accepting = false;
        })
    }

    /// Fetches a vendor.
    pub fn get(&self, id: VendorId) -> Result<VendorProfile> {
        self.store.read(|t| t.require::<VendorProfile>(id).cloned())?
    }

    /// Lists vendors, best rated first.
    pub fn list(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<VendorProfile>> {
        self.store.read(|t| {
            t.page(
                |v: &VendorProfile| {
                    filter.zone.is_none_or(|z| v.serves_zone(z))
                        && filter.category.is_none_or(|c| v.category == c)
                        && filter.food_type.is_none_or(|f| v.food_type.can_serve(f))
                        && filter.verified.is_none_or(|flag| v.is_verified == flag)
                        && (!filter.available_only || v.is_assignable())
                },
                |a, b| {
                    b.rating
                        .average
                        .total_cmp(&a.rating.average)
                        .then_with(|| a.business_name.cmp(&b.business_name))
                        .then(a.id.cmp(&b.id))
                },
                page,
            )
        })
    }

    fn set_flags<F>(&self, id: VendorId, f: F) -> Result<VendorProfile>
    where
        F: FnOnce(&mut VendorProfile),
    {
        self.store.write(|tx| {
            tx.update::<VendorProfile, _, _>(id, |vendor| {
                f(vendor);
                vendor.touch();
                Ok(vendor.clone())
            })
        })
    }
}

fn cuisines(list: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    list.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && seen.insert(c.to_lowercase()))
        .collect()
}

fn zone_set(tx: &Transaction<'_>, zones: &[ZoneId]) -> Result<BTreeSet<ZoneId>> {
    if zones.is_empty() {
        return Err(Error::validation_field("zones", "at least one zone is required"));
    }
    for zone in zones {
        tx.require::<LocationZone>(*zone)?;
    }
    Ok(zones.iter().copied().collect())
}

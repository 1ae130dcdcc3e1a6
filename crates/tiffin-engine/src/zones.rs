//! Location zones and pincode serviceability.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tiffin_core::{Error, LocationZone, Money, Page, PageRequest, Result, ZoneId};
use tiffin_store::{Store, Tables};

use crate::validate;

/// Input for creating a zone.
#[derive(Debug, Clone, Deserialize)]
pub struct NewZone {
    /// Display name
    pub name: String,
    /// City
    pub city: String,
    /// 6-digit pincodes served
    pub pincodes: Vec<String>,
    /// Fee charged per subscription
    #[serde(default)]
    pub base_delivery_fee: Money,
    /// Subtotal at or above which delivery is free
    #[serde(default)]
    pub free_delivery_threshold: Option<Money>,
}

/// Partial update of a zone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneUpdate {
    /// New name
    pub name: Option<String>,
    /// New city
    pub city: Option<String>,
    /// Replacement pincode set
    pub pincodes: Option<Vec<String>>,
    /// New delivery fee
    pub base_delivery_fee: Option<Money>,
    /// New free-delivery threshold
    pub free_delivery_threshold: Option<Money>,
    /// Enable or disable the zone
    pub is_active: Option<bool>,
}

/// Whether a pincode can be delivered to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Serviceability {
    /// Pincode checked
    pub pincode: String,
    /// `true` if an active zone serves it
    pub serviceable: bool,
    /// Serving zone
    pub zone: Option<LocationZone>,
}

/// Zone management.
#[derive(Clone, Debug)]
pub struct ZoneService {
    store: Store,
}

impl ZoneService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a zone. A pincode may belong to only one active zone.
    pub fn create(&self, input: NewZone) -> Result<LocationZone> {
        let mut zone = LocationZone::new(
            validate::non_empty("name", &input.name)?,
            validate::non_empty("city", &input.city)?,
        );
        zone.pincodes = pincode_set(&input.pincodes)?;
        zone.base_delivery_fee = input.base_delivery_fee;
        zone.free_delivery_threshold = input.free_delivery_threshold;

        self.store.write(|tx| {
            check_overlap(tx.tables(), &zone)?;
            tx.insert(zone.clone())?;
            tracing::info!(zone = %zone.id, name = %zone.name, pincodes = zone.pincodes.len(), "Zone created");
            Ok(zone)
        })
    }

    /// Applies a partial update.
    pub fn update(&self, id: ZoneId, update: ZoneUpdate) -> Result<LocationZone> {
        let pincodes = update.pincodes.as_deref().map(pincode_set).transpose()?;
        let name = update
            .name
            .as_deref()
            .map(|n| validate::non_empty("name", n))
            .transpose()?;
        let city = update
            .city
            .as_deref()
            .map(|c| validate::non_empty("city", c))
            .transpose()?;

        self.store.write(|tx| {
            let mut zone = tx.require::<LocationZone>(id)?.clone();
            if let Some(name) = name {
                zone.name = name;
            }
            if let Some(city) = city {
                zone.city = city;
            }
            if let Some(pincodes) = pincodes {
                zone.pincodes = pincodes;
            }
            if let Some(fee) = update.base_delivery_fee {
                zone.base_delivery_fee = fee;
            }
            if update.free_delivery_threshold.is_some() {
                zone.free_delivery_threshold = update.free_delivery_threshold;
            }
            if let Some(active) = update.is_active {
                zone.is_active = active;
            }
            check_overlap(tx.tables(), &zone)?;
            zone.updated_at = chrono::Utc::now();
            tx.put(zone.clone());
            Ok(zone)
        })
    }

    /// Deactivates a zone. Existing subscriptions keep their zone.
    pub fn deactivate(&self, id: ZoneId) -> Result<LocationZone> {
        self.update(
            id,
            ZoneUpdate {
                is_active: Some(false),
                ..ZoneUpdate::default()
            },
        )
    }

    /// Fetches a zone.
    pub fn get(&self, id: ZoneId) -> Result<LocationZone> {
        self.store.read(|t| t.require::<LocationZone>(id).cloned())?
    }

    /// Lists zones by name, optionally only active ones or one city.
    pub fn list(
        &self,
        active_only: bool,
        city: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<LocationZone>> {
        self.store.read(|t| {
            t.page(
                |z: &LocationZone| {
                    (!active_only || z.is_active)
                        && city.is_none_or(|c| z.city.eq_ignore_ascii_case(c))
                },
                |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
                page,
            )
        })
    }

    /// Checks whether `pincode` is served by an active zone.
    pub fn serviceability(&self, pincode: &str) -> Result<Serviceability> {
        let pincode = validate::pincode("pincode", pincode)?;
        let zone = self.store.read(|t| zone_for_pincode(t, &pincode).cloned())?;
        Ok(Serviceability {
            serviceable: zone.is_some(),
            pincode,
            zone,
        })
    }
}

/// The active zone serving `pincode`, if any.
pub(crate) fn zone_for_pincode<'t>(tables: &'t Tables, pincode: &str) -> Option<&'t LocationZone> {
    tables.find::<LocationZone, _>(|z| z.serves(pincode))
}

fn pincode_set(pincodes: &[String]) -> Result<BTreeSet<String>> {
    if pincodes.is_empty() {
        return Err(Error::validation_field("pincodes", "at least one pincode is required"));
    }
    pincodes
        .iter()
        .map(|p| validate::pincode("pincodes", p))
        .collect()
}

fn check_overlap(tables: &Tables, zone: &LocationZone) -> Result<()> {
    if !zone.is_active {
        return Ok(());
    }
    let clash = tables.iter::<LocationZone>().find_map(|other| {
        if other.id == zone.id || !other.is_active {
            return None;
        }
        zone.pincodes
            .intersection(&other.pincodes)
            .next()
            .map(|p| (other, p))
    });
    match clash {
        Some((other, pincode)) => Err(Error::conflict(format!(
            "pincode {pincode} is already served by zone '{}'",
            other.name
        ))),
        None => Ok(()),
    }
}

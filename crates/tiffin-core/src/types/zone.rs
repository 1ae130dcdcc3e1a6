//! Location zones: pincode serviceability and delivery fees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Money, ZoneId};

/// A geographic service area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationZone {
    /// Unique identifier
    pub id: ZoneId,
    /// Zone name (e.g. "Koramangala")
    pub name: String,
    /// City the zone belongs to
    pub city: String,
    /// Pincodes served by this zone
    pub pincodes: BTreeSet<String>,
    /// Delivery fee charged per subscription
    pub base_delivery_fee: Money,
    /// Subtotal at or above which delivery is free
    pub free_delivery_threshold: Option<Money>,
    /// Inactive zones are not serviceable
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl LocationZone {
    /// Creates an active zone with no pincodes and no delivery fee.
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ZoneId::new(),
            name: name.into(),
            city: city.into(),
            pincodes: BTreeSet::new(),
            base_delivery_fee: Money::ZERO,
            free_delivery_threshold: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the zone is active and covers `pincode`.
    pub fn serves(&self, pincode: &str) -> bool {
        self.is_active && self.pincodes.contains(pincode.trim())
    }

    /// Delivery fee for an order of the given subtotal.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::{LocationZone, Money};
    ///
    /// let mut zone = LocationZone::new("Indiranagar", "Bengaluru");
    /// zone.base_delivery_fee = Money::from_minor(4_000);
    /// zone.free_delivery_threshold = Some(Money::from_minor(300_000));
    ///
    /// assert_eq!(zone.delivery_fee(Money::from_minor(100_000)), Money::from_minor(4_000));
    /// assert_eq!(zone.delivery_fee(Money::from_minor(300_000)), Money::ZERO);
    /// ```
    pub fn delivery_fee(&self, subtotal: Money) -> Money {
        match self.free_delivery_threshold {
            Some(threshold) if subtotal >= threshold => Money::ZERO,
            _ => self.base_delivery_fee,
        }
    }
}

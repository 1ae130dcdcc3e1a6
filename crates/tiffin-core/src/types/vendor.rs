//! Vendor profiles: capacity, rating, verification and availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::types::{FoodType, UserId, VendorId, ZoneId};

/// Kind of kitchen a vendor operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorCategory {
    /// Individual cooking from home
    HomeChef,
    /// Dine-in restaurant
    Restaurant,
    /// Delivery-only kitchen
    CloudKitchen,
}

impl fmt::Display for VendorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorCategory::HomeChef => write!(f, "home_chef"),
            VendorCategory::Restaurant => write!(f, "restaurant"),
            VendorCategory::CloudKitchen => write!(f, "cloud_kitchen"),
        }
    }
}

/// Subscriber capacity of a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCapacity {
    /// Maximum concurrent subscriptions
    pub max_subscribers: u32,
    /// Subscriptions currently assigned
    pub current_subscribers: u32,
}

impl VendorCapacity {
    /// Creates an empty capacity with the given maximum.
    pub fn new(max_subscribers: u32) -> Self {
        Self {
            max_subscribers,
            current_subscribers: 0,
        }
    }

    /// Free subscriber slots.
    pub fn available(&self) -> u32 {
        self.max_subscribers.saturating_sub(self.current_subscribers)
    }

    /// Fraction of capacity in use, 1.0 when `max_subscribers` is zero.
    pub fn utilization(&self) -> f64 {
        if self.max_subscribers == 0 {
            return 1.0;
        }
        f64::from(self.current_subscribers) / f64::from(self.max_subscribers)
    }

    /// Takes one slot. Returns `false` if full.
    pub fn reserve(&mut self) -> bool {
        if self.available() == 0 {
            return false;
        }
        self.current_subscribers += 1;
        true
    }

    /// Releases one slot.
    pub fn release(&mut self) {
        self.current_subscribers = self.current_subscribers.saturating_sub(1);
    }
}

/// Running aggregate of review ratings.
///
/// Keeps the star total so that the average stays exact as reviews are
/// added, edited and removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating, 0.0 when there are no reviews
    pub average: f64,
    /// Number of reviews
    pub count: u32,
    /// Sum of all stars
    pub total_stars: u64,
}

impl RatingSummary {
    /// Adds a rating.
    pub fn add(&mut self, stars: u8) {
        self.count += 1;
        self.total_stars += u64::from(stars);
        self.recompute();
    }

    /// Removes a previously added rating.
    pub fn remove(&mut self, stars: u8) {
        if self.count == 0 {
            return;
        }
        self.count -= 1;
        self.total_stars = self.total_stars.saturating_sub(u64::from(stars));
        self.recompute();
    }

    /// Replaces one rating with another.
    pub fn replace(&mut self, old: u8, new: u8) {
        self.remove(old);
        self.add(new);
    }

    fn recompute(&mut self) {
        self.average = if self.count == 0 {
            0.0
        } else {
            self.total_stars as f64 / f64::from(self.count)
        };
    }
}

/// A vendor's business record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProfile {
    /// Unique identifier
    pub id: VendorId,
    /// Owning user
    pub owner: UserId,
    /// Trading name
    pub business_name: String,
    /// Kitchen kind
    pub category: VendorCategory,
    /// What the vendor cooks
    pub food_type: FoodType,
    /// Cuisines offered
    pub cuisines: Vec<String>,
    /// Zones the vendor delivers to
    pub zones: BTreeSet<ZoneId>,
    /// Subscriber capacity
    pub capacity: VendorCapacity,
    /// Review aggregate
    pub rating: RatingSummary,
    /// Passed admin verification
    pub is_verified: bool,
    /// Account enabled
    pub is_active: bool,
    /// Currently taking new subscribers
    pub is_accepting: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl VendorProfile {
    /// Creates an unverified, active, accepting vendor.
    pub fn new(
        owner: UserId,
        business_name: impl Into<String>,
        category: VendorCategory,
        food_type: FoodType,
        max_subscribers: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VendorId::new(),
            owner,
            business_name: business_name.into(),
            category,
            food_type,
            cuisines: Vec::new(),
            zones: BTreeSet::new(),
            capacity: VendorCapacity::new(max_subscribers),
            rating: RatingSummary::default(),
            is_verified: false,
            is_active: true,
            is_accepting: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Verified, active, accepting, and with free capacity.
    pub fn is_assignable(&self) -> bool {
        self.is_verified && self.is_active && self.is_accepting && self.capacity.available() > 0
    }

    /// Returns `true` if the vendor delivers to `zone`.
    pub fn serves_zone(&self, zone: ZoneId) -> bool {
        self.zones.contains(&zone)
    }

    /// Marks the record modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor() -> VendorProfile {
        VendorProfile::new(
            UserId::new(),
            "Amma's Kitchen",
            VendorCategory::HomeChef,
            FoodType::Veg,
            2,
        )
    }

    #[test]
    fn test_new_vendor_is_not_assignable_until_verified() {
        let mut v = vendor();
        assert!(!v.is_assignable());
        v.is_verified = true;
        assert!(v.is_assignable());
    }

    #[test]
    fn test_capacity_reserve_and_release() {
        let mut cap = VendorCapacity::new(1);
        assert!(cap.reserve());
        assert!(!cap.reserve());
        assert_eq!(cap.available(), 0);
        cap.release();
        cap.release();
        assert_eq!(cap.current_subscribers, 0);
    }

    #[test]
    fn test_utilization() {
        let mut cap = VendorCapacity::new(4);
        cap.current_subscribers = 1;
        assert!((cap.utilization() - 0.25).abs() < f64::EPSILON);
        assert!((VendorCapacity::new(0).utilization() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_vendor_not_assignable() {
        let mut v = vendor();
        v.is_verified = true;
        v.capacity.current_subscribers = 2;
        assert!(!v.is_assignable());
    }

    #[test]
    fn test_rating_summary_stays_exact() {
        let mut r = RatingSummary::default();
        r.add(5);
        r.add(3);
        assert!((r.average - 4.0).abs() < f64::EPSILON);
        r.replace(3, 4);
        assert!((r.average - 4.5).abs() < f64::EPSILON);
        r.remove(5);
        r.remove(4);
        assert_eq!(r.count, 0);
        assert_eq!(r.average, 0.0);
        r.remove(4);
        assert_eq!(r.count, 0);
    }
}

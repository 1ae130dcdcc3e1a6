//! Vendor matching for assignment requests.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use tiffin_core::{
    Error, FoodType, Result, SubscriptionPlan, UserSubscription, VendorAssignmentRequest,
    VendorCategory, VendorId, VendorProfile, ZoneId,
};
use tiffin_store::Tables;

/// What a vendor must satisfy to take a request.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCriteria {
    /// Zone the vendor must serve
    pub zone: ZoneId,
    /// Food type of the subscribed plan
    pub food_type: FoodType,
    /// Vendor currently assigned, never a candidate
    pub exclude: Option<VendorId>,
    /// Restrict to one kitchen kind
    pub category: Option<VendorCategory>,
    /// Rated vendors below this average are skipped
    pub min_rating: f64,
}

impl MatchCriteria {
    /// Criteria for `request`, read from its subscription and plan.
    pub fn for_request(
        tables: &Tables,
        request: &VendorAssignmentRequest,
        min_rating: f64,
    ) -> Result<Self> {
        let subscription = tables.require::<UserSubscription>(request.subscription)?;
        let plan = tables.require::<SubscriptionPlan>(subscription.plan)?;
        Ok(Self {
            zone: subscription.delivery.zone,
            food_type: plan.food_type,
            exclude: subscription.vendor,
            category: None,
            min_rating,
        })
    }

    /// Restricts matching to one category.
    pub fn with_category(mut self, category: Option<VendorCategory>) -> Self {
        self.category = category;
        self
    }

    /// Checks one vendor, returning the first failed rule.
    pub fn check(&self, vendor: &VendorProfile) -> std::result::Result<(), Ineligibility> {
        if self.exclude == Some(vendor.id) {
            return Err(Ineligibility::CurrentVendor);
        }
        if !vendor.is_verified {
            return Err(Ineligibility::NotVerified);
        }
        if !vendor.is_active {
            return Err(Ineligibility::Inactive);
        }
        if !vendor.is_accepting {
            return Err(Ineligibility::NotAccepting);
        }
        if !vendor.serves_zone(self.zone) {
            return Err(Ineligibility::OutOfZone);
        }
        if !vendor.food_type.can_serve(self.food_type) {
            return Err(Ineligibility::FoodTypeMismatch);
        }
        if self.category.is_some_and(|c| c != vendor.category) {
            return Err(Ineligibility::CategoryMismatch);
        }
        if vendor.rating.count > 0 && vendor.rating.average < self.min_rating {
            return Err(Ineligibility::BelowMinRating);
        }
        if vendor.capacity.available() == 0 {
            return Err(Ineligibility::NoCapacity);
        }
        Ok(())
    }

    /// Eligible vendors, best first.
    pub fn rank<'a, I>(&self, vendors: I) -> Vec<&'a VendorProfile>
    where
        I: IntoIterator<Item = &'a VendorProfile>,
    {
        let mut eligible: Vec<_> = vendors
            .into_iter()
            .filter(|v| self.check(v).is_ok())
            .collect();
        eligible.sort_by(|a, b| compare_candidates(a, b));
        eligible
    }

    /// The best eligible vendor, if any.
    pub fn best<'a, I>(&self, vendors: I) -> Option<&'a VendorProfile>
    where
        I: IntoIterator<Item = &'a VendorProfile>,
    {
        self.rank(vendors).into_iter().next()
    }
}

/// Why a vendor cannot take a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Already assigned to the subscription
    CurrentVendor,
    /// Not yet verified
    NotVerified,
    /// Account disabled
    Inactive,
    /// Not taking new subscribers
    NotAccepting,
    /// Does not deliver to the zone
    OutOfZone,
    /// Cannot cook the plan's food type
    FoodTypeMismatch,
    /// Wrong kitchen kind
    CategoryMismatch,
    /// Rated below the minimum
    BelowMinRating,
    /// No free slots
    NoCapacity,
}

impl Ineligibility {
    /// Converts into the error reported for an explicit vendor choice.
    pub fn into_error(self, vendor: VendorId) -> Error {
        match self {
            Ineligibility::NoCapacity => Error::CapacityExhausted {
                vendor: vendor.to_string(),
            },
            other => Error::conflict(format!("vendor {vendor} is not eligible: {other}")),
        }
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Ineligibility::CurrentVendor => "already the current vendor",
            Ineligibility::NotVerified => "not verified",
            Ineligibility::Inactive => "inactive",
            Ineligibility::NotAccepting => "not accepting subscribers",
            Ineligibility::OutOfZone => "does not serve the delivery zone",
            Ineligibility::FoodTypeMismatch => "cannot serve the plan's food type",
            Ineligibility::CategoryMismatch => "category does not match",
            Ineligibility::BelowMinRating => "rating below minimum",
            Ineligibility::NoCapacity => "no remaining capacity",
        };
        f.write_str(text)
    }
}

/// Candidate order: rating desc, utilization asc, review count desc, name.
pub fn compare_candidates(a: &VendorProfile, b: &VendorProfile) -> Ordering {
    b.rating
        .average
        .total_cmp(&a.rating.average)
        .then_with(|| {
            a.capacity
                .utilization()
                .total_cmp(&b.capacity.utilization())
        })
        .then_with(|| b.rating.count.cmp(&a.rating.count))
        .then_with(|| a.business_name.cmp(&b.business_name))
        .then_with(|| a.id.cmp(&b.id))
}

/// A vendor offered for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Vendor
    pub vendor: VendorId,
    /// Trading name
    pub business_name: String,
    /// Kitchen kind
    pub category: VendorCategory,
    /// Food type
    pub food_type: FoodType,
    /// Average rating
    pub rating: f64,
    /// Number of reviews
    pub review_count: u32,
    /// Free slots
    pub available_capacity: u32,
    /// Fraction of capacity in use
    pub utilization: f64,
}

impl From<&VendorProfile> for Candidate {
    fn from(v: &VendorProfile) -> Self {
        Self {
            vendor: v.id,
            business_name: v.business_name.clone(),
            category: v.category,
            food_type: v.food_type,
            rating: v.rating.average,
            review_count: v.rating.count,
            available_capacity: v.capacity.available(),
            utilization: v.capacity.utilization(),
        }
    }
}

//! In-memory tables, one ordered map per record kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tiffin_core::{
    Error, LocationZone, Menu, MenuId, Order, OrderId, Page, PageRequest, PlanId, PromoCode,
    PromoCodeId, Referral, ReferralId, RequestId, Result, Review, ReviewId, SubscriptionId,
    SubscriptionPlan, UserAccount, UserId, UserSubscription, VendorAssignmentRequest, VendorId,
    VendorProfile, ZoneId,
};

/// A record kind stored in its own table.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type.
    type Id: Copy + Ord + fmt::Display + Send + Sync + 'static;

    /// Name used in errors and logs.
    const ENTITY: &'static str;

    /// Primary key of this record.
    fn id(&self) -> Self::Id;

    /// The table holding this kind.
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self>;

    /// Mutable access to the table holding this kind.
    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;
}

/// Every record in the system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    /// User accounts
    pub users: BTreeMap<UserId, UserAccount>,
    /// Location zones
    pub zones: BTreeMap<ZoneId, LocationZone>,
    /// Vendor profiles
    pub vendors: BTreeMap<VendorId, VendorProfile>,
    /// Subscription plans
    pub plans: BTreeMap<PlanId, SubscriptionPlan>,
    /// Vendor menus
    pub menus: BTreeMap<MenuId, Menu>,
    /// User subscriptions
    pub subscriptions: BTreeMap<SubscriptionId, UserSubscription>,
    /// Vendor assignment requests
    pub requests: BTreeMap<RequestId, VendorAssignmentRequest>,
    /// Orders
    pub orders: BTreeMap<OrderId, Order>,
    /// Promo codes
    pub promo_codes: BTreeMap<PromoCodeId, PromoCode>,
    /// Reviews
    pub reviews: BTreeMap<ReviewId, Review>,
    /// Referrals
    pub referrals: BTreeMap<ReferralId, Referral>,
}

macro_rules! record {
    ($ty:ty, $id:ty, $field:ident, $entity:literal) => {
        impl Record for $ty {
            type Id = $id;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> $id {
                self.id
            }

            fn table(tables: &Tables) -> &BTreeMap<$id, Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut BTreeMap<$id, Self> {
                &mut tables.$field
            }
        }
    };
}

record!(UserAccount, UserId, users, "user");
record!(LocationZone, ZoneId, zones, "zone");
record!(VendorProfile, VendorId, vendors, "vendor");
record!(SubscriptionPlan, PlanId, plans, "plan");
record!(Menu, MenuId, menus, "menu");
record!(UserSubscription, SubscriptionId, subscriptions, "subscription");
record!(VendorAssignmentRequest, RequestId, requests, "assignment request");
record!(Order, OrderId, orders, "order");
record!(PromoCode, PromoCodeId, promo_codes, "promo code");
record!(Review, ReviewId, reviews, "review");
record!(Referral, ReferralId, referrals, "referral");

impl Tables {
    /// Looks up a record.
    pub fn get<R: Record>(&self, id: R::Id) -> Option<&R> {
        R::table(self).get(&id)
    }

    /// Looks up a record, failing with `NotFound`.
    pub fn require<R: Record>(&self, id: R::Id) -> Result<&R> {
        self.get(id).ok_or_else(|| Error::not_found(R::ENTITY, id))
    }

    /// Iterates over all records of a kind in key order.
    pub fn iter<R: Record>(&self) -> impl Iterator<Item = &R> {
        R::table(self).values()
    }

    /// Number of records of a kind.
    pub fn count<R: Record>(&self) -> usize {
        R::table(self).len()
    }

    /// Finds the first record matching `predicate`.
    pub fn find<R, P>(&self, predicate: P) -> Option<&R>
    where
        R: Record,
        P: Fn(&R) -> bool,
    {
        self.iter::<R>().find(|r| predicate(r))
    }

    /// Filters, sorts and slices one page of records.
    pub fn page<R, P, C>(&self, predicate: P, mut compare: C, request: PageRequest) -> Page<R>
    where
        R: Record,
        P: Fn(&R) -> bool,
        C: FnMut(&R, &R) -> Ordering,
    {
        let mut matching: Vec<&R> = self.iter::<R>().filter(|r| predicate(r)).collect();
        matching.sort_by(|a, b| compare(a, b));
        Page::from_sorted(matching, request).map(R::clone)
    }
}

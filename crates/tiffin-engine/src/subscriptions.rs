//! Subscription purchase and lifecycle.
//!
//! A purchase runs as one transaction: the promo redemption, the new
//! subscription, its initial assignment request and any referral reward
//! are stored together or not at all.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tiffin_core::config::ReferralConfig;
use tiffin_core::{
    DeliveryDetails, Error, MealType, Money, Page, PageRequest, PlanId, PriceBreakdown, Result,
    SubscriptionId, SubscriptionPlan, SubscriptionStatus, UserAccount, UserId, UserSubscription,
    VendorAssignmentRequest, VendorId, VendorProfile,
};
use tiffin_store::{Store, Transaction};

use crate::assignment::{cancel_pending_for, open_initial_request};
use crate::users::reward_first_purchase;
use crate::zones::zone_for_pincode;
use crate::{promos, validate};

/// Delivery details supplied at purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryInput {
    /// Street address
    pub address: String,
    /// 6-digit pincode
    pub pincode: String,
    /// Meal slots; every slot of the plan when empty
    #[serde(default)]
    pub meal_types: BTreeSet<MealType>,
    /// Rider instructions
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Input for purchasing a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct Purchase {
    /// Buyer
    pub user: UserId,
    /// Plan bought
    pub plan: PlanId,
    /// Where to deliver
    pub delivery: DeliveryInput,
    /// Promo code to apply
    #[serde(default)]
    pub promo_code: Option<String>,
    /// First delivery date; today when unset
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Everything a purchase created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    /// New subscription
    pub subscription: UserSubscription,
    /// Its initial assignment request
    pub assignment: VendorAssignmentRequest,
    /// Whether a referral was paid out
    pub referral_rewarded: bool,
}

/// Listing filter for subscriptions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionFilter {
    /// Only this subscriber's
    pub user: Option<UserId>,
    /// Only in this state
    pub status: Option<SubscriptionStatus>,
    /// Only fulfilled by this vendor
    pub vendor: Option<VendorId>,
}

/// Subscription purchase and lifecycle.
#[derive(Clone, Debug)]
pub struct SubscriptionService {
    store: Store,
    referral: ReferralConfig,
}

impl SubscriptionService {
    /// Creates the service.
    pub fn new(store: Store, referral: ReferralConfig) -> Self {
        Self { store, referral }
    }

    /// Buys a plan. Payment is treated as confirmed.
    pub fn purchase(&self, input: Purchase) -> Result<PurchaseReceipt> {
        let address = validate::non_empty("delivery.address", &input.delivery.address)?;
        let pincode = validate::pincode("delivery.pincode", &input.delivery.pincode)?;
        let instructions = validate::optional(input.delivery.instructions);
        let promo_code = validate::optional(input.promo_code);
        let now = Utc::now();
        let today = now.date_naive();
        let start_date = input.start_date.unwrap_or(today);
        if start_date < today {
            return Err(Error::validation_field(
                "start_date",
                "must not be in the past",
            ));
        }

        self.store.write(|tx| {
            tx.require::<UserAccount>(input.user)?;
            let plan = tx.require::<SubscriptionPlan>(input.plan)?.clone();
            if !plan.is_active {
                return Err(Error::conflict(format!(
                    "plan {} is not available for purchase",
                    plan.id
                )));
            }
            let zone = zone_for_pincode(tx.tables(), &pincode)
                .cloned()
                .ok_or_else(|| {
                    Error::validation_field(
                        "delivery.pincode",
                        format!("pincode {pincode} is not serviceable"),
                    )
                })?;
            let meal_types = if input.delivery.meal_types.is_empty() {
                plan.meal_types.clone()
            } else if input.delivery.meal_types.is_subset(&plan.meal_types) {
                input.delivery.meal_types
            } else {
                return Err(Error::validation_field(
                    "delivery.meal_types",
                    "must be covered by the plan",
                ));
            };

            let discount = match &promo_code {
                Some(code) => promos::redeem(tx, code, input.user, plan.id, plan.price, now)?.discount,
                None => Money::ZERO,
            };
            let price = PriceBreakdown::new(plan.price, discount, zone.delivery_fee(plan.price));

            let end_date = start_date
                .checked_add_days(Days::new(u64::from(plan.duration_days.saturating_sub(1))))
                .ok_or_else(|| Error::validation_field("start_date", "is out of range"))?;
            let subscription = UserSubscription {
                id: SubscriptionId::new(),
                user: input.user,
                plan: plan.id,
                status: SubscriptionStatus::Active,
                vendor: None,
                credits_total: plan.total_credits,
                credits_used: 0,
                vendor_switches_remaining: plan.vendor_switches_allowed,
                delivery: DeliveryDetails {
                    address,
                    pincode,
                    zone: zone.id,
                    meal_types,
                    instructions,
                },
                start_date,
                end_date,
                price,
                promo_code: promo_code.as_deref().map(tiffin_core::util::normalize_code),
                switch_history: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            tx.insert(subscription.clone())?;
            let assignment = open_initial_request(tx, &subscription)?;
            let referral_rewarded = reward_first_purchase(tx, input.user, &self.referral)?;

            tracing::info!(
                subscription = %subscription.id,
                user = %subscription.user,
                plan = %plan.id,
                zone = %zone.id,
                total = %price.total,
                "Subscription purchased"
            );
            Ok(PurchaseReceipt {
                subscription,
                assignment,
                referral_rewarded,
            })
        })
    }

    /// Puts an active subscription on hold. The vendor slot is kept.
    pub fn pause(&self, id: SubscriptionId) -> Result<UserSubscription> {
        self.store.write(|tx| {
            tx.update::<UserSubscription, _, _>(id, |s| {
                s.transition(SubscriptionStatus::Paused)?;
                Ok(s.clone())
            })
        })
    }

    /// Resumes a paused subscription.
    pub fn resume(&self, id: SubscriptionId) -> Result<UserSubscription> {
        self.store.write(|tx| {
            tx.update::<UserSubscription, _, _>(id, |s| {
                if s.status != SubscriptionStatus::Paused {
                    return Err(Error::transition(
                        "subscription",
                        s.status,
                        SubscriptionStatus::Active,
                    ));
                }
                s.transition(SubscriptionStatus::Active)?;
                Ok(s.clone())
            })
        })
    }

    /// Cancels a subscription, freeing its vendor slot.
    pub fn cancel(&self, id: SubscriptionId) -> Result<UserSubscription> {
        self.store
            .write(|tx| end_subscription(tx, id, SubscriptionStatus::Cancelled, "subscription cancelled"))
    }

    /// Expires every subscription whose window ended before `today`.
    pub fn expire_due(&self, today: NaiveDate) -> Result<Vec<SubscriptionId>> {
        let expired = self.store.write(|tx| {
            let due: Vec<SubscriptionId> = tx
                .tables()
                .iter::<UserSubscription>()
                .filter(|s| s.status.holds_vendor() && s.end_date < today)
                .map(|s| s.id)
                .collect();
            for id in &due {
                end_subscription(tx, *id, SubscriptionStatus::Expired, "subscription expired")?;
            }
            Ok(due)
        })?;
        tracing::info!(count = expired.len(), %today, "Expired subscriptions");
        Ok(expired)
    }

    /// Fetches a subscription.
    pub fn get(&self, id: SubscriptionId) -> Result<UserSubscription> {
        self.store
            .read(|t| t.require::<UserSubscription>(id).cloned())?
    }

    /// Lists subscriptions, newest first.
    pub fn list(
        &self,
        filter: &SubscriptionFilter,
        page: PageRequest,
    ) -> Result<Page<UserSubscription>> {
        self.store.read(|t| {
            t.page(
                |s: &UserSubscription| {
                    filter.user.is_none_or(|u| s.user == u)
                        && filter.status.is_none_or(|st| s.status == st)
                        && filter.vendor.is_none_or(|v| s.vendor == Some(v))
                },
                |a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)),
                page,
            )
        })
    }
}

/// Moves a subscription to Expired or Cancelled, releasing its vendor slot
/// and cancelling its pending requests.
pub(crate) fn end_subscription(
    tx: &mut Transaction<'_>,
    id: SubscriptionId,
    status: SubscriptionStatus,
    note: &str,
) -> Result<UserSubscription> {
    let sub = tx.update::<UserSubscription, _, _>(id, |s| {
        s.transition(status)?;
        Ok(s.clone())
    })?;
    if let Some(vendor) = sub.vendor
        && tx.get::<VendorProfile>(vendor).is_some()
    {
        tx.update::<VendorProfile, _, _>(vendor, |v| {
            v.capacity.release();
            v.touch();
            Ok(())
        })?;
    }
    let cancelled = cancel_pending_for(tx, id, note)?;
    tracing::info!(
        subscription = %id,
        status = %status,
        vendor = ?sub.vendor,
        cancelled_requests = cancelled,
        "Subscription ended"
    );
    Ok(sub)
}

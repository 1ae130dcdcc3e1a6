//! Purchased user subscriptions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{MealType, Money, PlanId, RequestId, SubscriptionId, UserId, VendorId, ZoneId};

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SubscriptionStatus {
    /// Meals are being delivered.
    Active,

    /// Temporarily on hold; keeps its vendor.
    Paused,

    /// Past its end date or out of credits.
    Expired,

    /// Cancelled by the user or an admin.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns `true` if the subscription is finished (Expired or Cancelled).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled
        )
    }

    /// Returns `true` if the subscription still holds a vendor slot.
    pub fn holds_vendor(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Paused)
    }

    /// Whether the state machine allows `self -> next`.
    pub fn can_transition_to(&self, next: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, next),
            (Active, Paused)
                | (Paused, Active)
                | (Active | Paused, Cancelled)
                | (Active | Paused, Expired)
        )
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Paused => write!(f, "paused"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Where and when meals are delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Street address
    pub address: String,
    /// 6-digit pincode
    pub pincode: String,
    /// Zone resolved from the pincode
    pub zone: ZoneId,
    /// Meal slots to deliver
    pub meal_types: BTreeSet<MealType>,
    /// Free-text instructions for the rider
    pub instructions: Option<String>,
}

/// Price paid at purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Plan price
    pub subtotal: Money,
    /// Promo discount
    pub discount: Money,
    /// Zone delivery fee
    pub delivery_fee: Money,
    /// Amount charged
    pub total: Money,
}

impl PriceBreakdown {
    /// Computes `subtotal - discount + delivery_fee`.
    pub fn new(subtotal: Money, discount: Money, delivery_fee: Money) -> Self {
        Self {
            subtotal,
            discount,
            delivery_fee,
            total: subtotal.saturating_sub(discount) + delivery_fee,
        }
    }
}

/// A completed vendor switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSwitch {
    /// Vendor before the switch
    pub from: VendorId,
    /// Vendor after the switch
    pub to: VendorId,
    /// Request that authorised the switch
    pub request: RequestId,
    /// When the switch was applied
    pub at: DateTime<Utc>,
}

/// A purchased plan instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSubscription {
    /// Unique identifier
    pub id: SubscriptionId,
    /// Subscriber
    pub user: UserId,
    /// Plan purchased
    pub plan: PlanId,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// Vendor fulfilling the subscription, once assigned
    pub vendor: Option<VendorId>,
    /// Credits granted
    pub credits_total: u32,
    /// Credits consumed by orders
    pub credits_used: u32,
    /// Vendor switches still allowed
    pub vendor_switches_remaining: u32,
    /// Delivery details
    pub delivery: DeliveryDetails,
    /// First delivery date
    pub start_date: NaiveDate,
    /// Last delivery date (inclusive)
    pub end_date: NaiveDate,
    /// Price paid
    pub price: PriceBreakdown,
    /// Promo code applied at purchase
    pub promo_code: Option<String>,
    /// Applied vendor switches, oldest first
    pub switch_history: Vec<VendorSwitch>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl UserSubscription {
    /// Credits not yet consumed.
    pub fn credits_remaining(&self) -> u32 {
        self.credits_total.saturating_sub(self.credits_used)
    }

    /// Returns `true` if `date` falls in the delivery window.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Moves to `next`, enforcing the state machine.
    pub fn transition(&mut self, next: SubscriptionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::transition("subscription", self.status, next));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Whether a refund can bring this subscription back from Expired.
    ///
    /// Only a subscription that ran out of credits inside its window
    /// qualifies; one whose end date has passed stays expired.
    pub fn can_reactivate(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Expired
            && self.credits_remaining() > 0
            && today <= self.end_date
    }

    /// Moves Expired back to Active after credits were refunded.
    ///
    /// This is the only way out of Expired; [`transition`](Self::transition)
    /// refuses it.
    pub fn reactivate_after_refund(&mut self, today: NaiveDate) -> Result<()> {
        if !self.can_reactivate(today) {
            return Err(Error::transition(
                "subscription",
                self.status,
                SubscriptionStatus::Active,
            ));
        }
        self.status = SubscriptionStatus::Active;
        self.touch();
        Ok(())
    }

    /// Consumes one credit.
    pub fn consume_credit(&mut self) -> Result<()> {
        if self.credits_remaining() == 0 {
            return Err(Error::conflict(format!(
                "subscription {} has no credits remaining",
                self.id
            )));
        }
        self.credits_used += 1;
        self.touch();
        Ok(())
    }

    /// Returns one credit.
    pub fn refund_credit(&mut self) {
        self.credits_used = self.credits_used.saturating_sub(1);
        self.touch();
    }

    /// Records a vendor switch and spends one switch from the allowance.
    pub fn apply_switch(&mut self, to: VendorId, request: RequestId) -> Result<()> {
        let Some(from) = self.vendor else {
            return Err(Error::conflict(format!(
                "subscription {} has no vendor to switch from",
                self.id
            )));
        };
        if self.vendor_switches_remaining == 0 {
            return Err(Error::conflict(format!(
                "subscription {} has no vendor switches remaining",
                self.id
            )));
        }
        self.vendor_switches_remaining -= 1;
        self.vendor = Some(to);
        self.switch_history.push(VendorSwitch {
            from,
            to,
            request,
            at: Utc::now(),
        });
        self.touch();
        Ok(())
    }

    /// Marks the record modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn subscription() -> UserSubscription {
        let now = Utc::now();
        let start = now.date_naive();
        UserSubscription {
            id: SubscriptionId::new(),
            user: UserId::new(),
            plan: PlanId::new(),
            status: SubscriptionStatus::Active,
            vendor: None,
            credits_total: 2,
            credits_used: 0,
            vendor_switches_remaining: 1,
            delivery: DeliveryDetails {
                address: "12 MG Road".to_string(),
                pincode: "560001".to_string(),
                zone: ZoneId::new(),
                meal_types: [MealType::Lunch].into_iter().collect(),
                instructions: None,
            },
            start_date: start,
            end_date: start + chrono::Days::new(29),
            price: PriceBreakdown::default(),
            promo_code: None,
            switch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_transitions() {
        use SubscriptionStatus::*;
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Paused.can_transition_to(Cancelled));
        assert!(!Expired.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(!Expired.can_transition_to(Paused));
        assert!(!Active.can_transition_to(Active));
    }

    #[test]
    fn test_reactivation_needs_refunded_credit_in_window() {
        let mut sub = subscription();
        let today = sub.start_date;
        sub.credits_used = sub.credits_total;
        sub.transition(SubscriptionStatus::Expired).unwrap();

        assert!(sub.transition(SubscriptionStatus::Active).is_err());
        assert!(!sub.can_reactivate(today));
        let err = sub.reactivate_after_refund(today).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        sub.refund_credit();
        let after_window = sub.end_date + chrono::Days::new(1);
        assert!(!sub.can_reactivate(after_window));
        assert!(sub.reactivate_after_refund(after_window).is_err());
        assert_eq!(sub.status, SubscriptionStatus::Expired);

        sub.reactivate_after_refund(today).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.reactivate_after_refund(today).is_err());
    }

    #[test]
    fn test_cancelled_never_reactivates() {
        let mut sub = subscription();
        sub.transition(SubscriptionStatus::Cancelled).unwrap();
        assert!(!sub.can_reactivate(sub.start_date));
        assert!(sub.reactivate_after_refund(sub.start_date).is_err());
    }

    #[test]
    fn test_transition_error_names_states() {
        let mut sub = subscription();
        sub.transition(SubscriptionStatus::Cancelled).unwrap();
        let err = sub.transition(SubscriptionStatus::Paused).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid subscription transition: cancelled -> paused"
        );
    }

    #[test]
    fn test_credit_accounting() {
        let mut sub = subscription();
        sub.consume_credit().unwrap();
        sub.consume_credit().unwrap();
        assert_eq!(sub.credits_remaining(), 0);
        assert!(sub.consume_credit().is_err());
        sub.refund_credit();
        assert_eq!(sub.credits_remaining(), 1);
    }

    #[test]
    fn test_apply_switch() {
        let mut sub = subscription();
        let first = VendorId::new();
        let second = VendorId::new();
        assert!(sub.apply_switch(second, RequestId::new()).is_err());

        sub.vendor = Some(first);
        sub.apply_switch(second, RequestId::new()).unwrap();
        assert_eq!(sub.vendor, Some(second));
        assert_eq!(sub.vendor_switches_remaining, 0);
        assert_eq!(sub.switch_history.len(), 1);
        assert_eq!(sub.switch_history[0].from, first);

        assert!(sub.apply_switch(first, RequestId::new()).is_err());
        assert_eq!(sub.vendor, Some(second));
    }

    #[test]
    fn test_price_breakdown() {
        let price = PriceBreakdown::new(
            Money::from_minor(300_000),
            Money::from_minor(50_000),
            Money::from_minor(4_000),
        );
        assert_eq!(price.total, Money::from_minor(254_000));
    }

    #[test]
    fn test_covers_date() {
        let sub = subscription();
        assert!(sub.covers_date(sub.start_date));
        assert!(sub.covers_date(sub.end_date));
        assert!(!sub.covers_date(sub.end_date + chrono::Days::new(1)));
    }
}

//! Promo codes: discounts with usage limits, validity windows, and
//! applicability rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::types::{Money, PlanId, PromoCodeId, UserId};

/// How a promo code reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off, optionally capped.
    Percentage {
        /// 1..=100
        percent: u8,
        /// Largest discount granted
        max_discount: Option<Money>,
    },
    /// Fixed amount off.
    Flat {
        /// Amount deducted
        amount: Money,
    },
}

impl Discount {
    /// Discount granted on `amount`; never more than `amount`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::{Discount, Money};
    ///
    /// let pct = Discount::Percentage { percent: 20, max_discount: Some(Money::from_minor(5_000)) };
    /// assert_eq!(pct.apply(Money::from_minor(10_000)), Money::from_minor(2_000));
    /// assert_eq!(pct.apply(Money::from_minor(100_000)), Money::from_minor(5_000));
    ///
    /// let flat = Discount::Flat { amount: Money::from_minor(3_000) };
    /// assert_eq!(flat.apply(Money::from_minor(1_000)), Money::from_minor(1_000));
    /// ```
    pub fn apply(&self, amount: Money) -> Money {
        let discount = match *self {
            Discount::Percentage {
                percent,
                max_discount,
            } => {
                let raw = amount.percent(percent.min(100));
                max_discount.map_or(raw, |cap| raw.min(cap))
            }
            Discount::Flat { amount: flat } => flat,
        };
        discount.min(amount)
    }

    /// Checks that the discount is well-formed.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Discount::Percentage { percent, .. } if percent == 0 || percent > 100 => Err(
                Error::validation_field("discount.percent", "must be between 1 and 100"),
            ),
            Discount::Flat { amount } if amount.is_zero() => Err(Error::validation_field(
                "discount.amount",
                "must be greater than zero",
            )),
            _ => Ok(()),
        }
    }
}

/// Result of checking a code against an order amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoQuote {
    /// Normalized code
    pub code: String,
    /// Amount before discount
    pub amount: Money,
    /// Discount granted
    pub discount: Money,
    /// Amount after discount
    pub final_amount: Money,
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Unique identifier
    pub id: PromoCodeId,
    /// Upper-case code, unique
    pub code: String,
    /// Marketing description
    pub description: String,
    /// Discount rule
    pub discount: Discount,
    /// Smallest order amount the code applies to
    pub min_order_amount: Money,
    /// Start of validity
    pub valid_from: DateTime<Utc>,
    /// End of validity (exclusive)
    pub valid_until: Option<DateTime<Utc>>,
    /// Total redemptions allowed
    pub usage_limit: Option<u32>,
    /// Redemptions allowed per user
    pub per_user_limit: Option<u32>,
    /// Redemptions so far
    pub used_count: u32,
    /// Redemptions per user
    pub usage_by_user: BTreeMap<UserId, u32>,
    /// Plans the code applies to; empty means every plan
    pub applicable_plans: BTreeSet<PlanId>,
    /// Deactivated codes are rejected
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// Creates an active, unlimited code valid from now.
    pub fn new(code: impl Into<String>, discount: Discount) -> Self {
        let now = Utc::now();
        Self {
            id: PromoCodeId::new(),
            code: code.into(),
            description: String::new(),
            discount,
            min_order_amount: Money::ZERO,
            valid_from: now,
            valid_until: None,
            usage_limit: None,
            per_user_limit: None,
            used_count: 0,
            usage_by_user: BTreeMap::new(),
            applicable_plans: BTreeSet::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Times `user` has redeemed this code.
    pub fn uses_by(&self, user: UserId) -> u32 {
        self.usage_by_user.get(&user).copied().unwrap_or(0)
    }

    /// Checks every rule and computes the discount, without redeeming.
    pub fn quote(
        &self,
        user: UserId,
        plan: Option<PlanId>,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<PromoQuote> {
        let reject = |reason: &str| Err(Error::promo(self.code.clone(), reason));

        if !self.is_active {
            return reject("code is inactive");
        }
        if now < self.valid_from {
            return reject("code is not yet valid");
        }
        if self.valid_until.is_some_and(|until| now >= until) {
            return reject("code has expired");
        }
        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return reject("usage limit reached");
        }
        if self
            .per_user_limit
            .is_some_and(|limit| self.uses_by(user) >= limit)
        {
            return reject("per-user limit reached");
        }
        if amount < self.min_order_amount {
            return reject("order amount below minimum");
        }
        if !self.applicable_plans.is_empty()
            && !plan.is_some_and(|p| self.applicable_plans.contains(&p))
        {
            return reject("not applicable to this plan");
        }

        let discount = self.discount.apply(amount);
        Ok(PromoQuote {
            code: self.code.clone(),
            amount,
            discount,
            final_amount: amount.saturating_sub(discount),
        })
    }

    /// Records one redemption by `user`.
    pub fn redeem(&mut self, user: UserId) {
        self.used_count += 1;
        *self.usage_by_user.entry(user).or_insert(0) += 1;
        self.updated_at = Utc::now();
    }
}

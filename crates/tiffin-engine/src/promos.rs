//! Promo code management, quoting and redemption.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;

use tiffin_core::util::normalize_code;
use tiffin_core::{
    Discount, Error, Money, Page, PageRequest, PlanId, PromoCode, PromoCodeId, PromoQuote, Result,
    SubscriptionPlan, UserId,
};
use tiffin_store::{Store, Tables, Transaction};

use crate::validate;

/// Input for creating a promo code.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromo {
    /// Code; stored upper-case without whitespace
    pub code: String,
    /// Marketing description
    #[serde(default)]
    pub description: String,
    /// Discount rule
    pub discount: Discount,
    /// Smallest order amount
    #[serde(default)]
    pub min_order_amount: Money,
    /// Start of validity; now when unset
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of validity (exclusive)
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    /// Total redemptions allowed
    #[serde(default)]
    pub usage_limit: Option<u32>,
    /// Redemptions allowed per user
    #[serde(default)]
    pub per_user_limit: Option<u32>,
    /// Plans the code applies to; empty means all
    #[serde(default)]
    pub applicable_plans: BTreeSet<PlanId>,
}

/// Partial update of a promo code. The code itself cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoUpdate {
    /// New description
    pub description: Option<String>,
    /// New discount rule
    pub discount: Option<Discount>,
    /// New minimum order amount
    pub min_order_amount: Option<Money>,
    /// New start of validity
    pub valid_from: Option<DateTime<Utc>>,
    /// New end of validity
    pub valid_until: Option<DateTime<Utc>>,
    /// New total limit
    pub usage_limit: Option<u32>,
    /// New per-user limit
    pub per_user_limit: Option<u32>,
    /// New plan restriction
    pub applicable_plans: Option<BTreeSet<PlanId>>,
    /// Enable or disable the code
    pub is_active: Option<bool>,
}

/// Promo code administration.
#[derive(Clone, Debug)]
pub struct PromoService {
    store: Store,
}

impl PromoService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a code. Codes are unique after normalization.
    pub fn create(&self, input: NewPromo) -> Result<PromoCode> {
        let code = normalize_code(&input.code);
        if code.is_empty() {
            return Err(Error::validation_field("code", "must not be empty"));
        }
        input.discount.validate()?;
        let mut promo = PromoCode::new(code, input.discount);
        promo.description = input.description.trim().to_string();
        promo.min_order_amount = input.min_order_amount;
        if let Some(from) = input.valid_from {
            promo.valid_from = from;
        }
        promo.valid_until = input.valid_until;
        promo.usage_limit = input.usage_limit;
        promo.per_user_limit = input.per_user_limit;
        promo.applicable_plans = input.applicable_plans;
        check_rules(&promo)?;

        self.store.write(|tx| {
            if find_code(tx.tables(), &promo.code).is_some() {
                return Err(Error::conflict(format!(
                    "promo code {} already exists",
                    promo.code
                )));
            }
            check_plans(tx, &promo.applicable_plans)?;
            tx.insert(promo.clone())?;
            tracing::info!(promo = %promo.id, code = %promo.code, "Promo code created");
            Ok(promo)
        })
    }

    /// Applies a partial update.
    pub fn update(&self, id: PromoCodeId, update: PromoUpdate) -> Result<PromoCode> {
        self.store.write(|tx| {
            if let Some(plans) = &update.applicable_plans {
                check_plans(tx, plans)?;
            }
            tx.update::<PromoCode, _, _>(id, |promo| {
                if let Some(description) = update.description {
                    promo.description = description.trim().to_string();
                }
                if let Some(discount) = update.discount {
                    discount.validate()?;
                    promo.discount = discount;
                }
                if let Some(amount) = update.min_order_amount {
                    promo.min_order_amount = amount;
                }
                if let Some(from) = update.valid_from {
                    promo.valid_from = from;
                }
                if update.valid_until.is_some() {
                    promo.valid_until = update.valid_until;
                }
                if update.usage_limit.is_some() {
                    promo.usage_limit = update.usage_limit;
                }
                if update.per_user_limit.is_some() {
                    promo.per_user_limit = update.per_user_limit;
                }
                if let Some(plans) = update.applicable_plans {
                    promo.applicable_plans = plans;
                }
                if let Some(active) = update.is_active {
                    promo.is_active = active;
                }
                check_rules(promo)?;
                if promo.usage_limit.is_some_and(|limit| limit < promo.used_count) {
                    return Err(Error::validation_field(
                        "usage_limit",
                        format!("must be at least the {} redemptions so far", promo.used_count),
                    ));
                }
                promo.updated_at = Utc::now();
                Ok(promo.clone())
            })
        })
    }

    /// Disables a code. Past redemptions are kept.
    pub fn deactivate(&self, id: PromoCodeId) -> Result<PromoCode> {
        self.update(
            id,
            PromoUpdate {
                is_active: Some(false),
                ..PromoUpdate::default()
            },
        )
    }

    /// Checks a code against an amount without redeeming it.
    pub fn quote(
        &self,
        code: &str,
        user: UserId,
        plan: Option<PlanId>,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<PromoQuote> {
        let code = normalize_code(code);
        self.store
            .read(|t| lookup(t, &code)?.quote(user, plan, amount, now))?
    }

    /// Fetches a code by id.
    pub fn get(&self, id: PromoCodeId) -> Result<PromoCode> {
        self.store.read(|t| t.require::<PromoCode>(id).cloned())?
    }

    /// Lists codes alphabetically.
    pub fn list(&self, active_only: bool, page: PageRequest) -> Result<Page<PromoCode>> {
        self.store.read(|t| {
            t.page(
                |p: &PromoCode| !active_only || p.is_active,
                |a, b| a.code.cmp(&b.code),
                page,
            )
        })
    }
}

/// Quotes and redeems `code` inside a purchase transaction.
pub(crate) fn redeem(
    tx: &mut Transaction<'_>,
    code: &str,
    user: UserId,
    plan: PlanId,
    amount: Money,
    now: DateTime<Utc>,
) -> Result<PromoQuote> {
    let code = normalize_code(code);
    let promo = lookup(tx.tables(), &code)?;
    let quote = promo.quote(user, Some(plan), amount, now)?;
    let id = promo.id;
    tx.update::<PromoCode, _, _>(id, |p| {
        p.redeem(user);
        Ok(())
    })?;
    tracing::info!(code = %quote.code, user = %user, discount = %quote.discount, "Promo code redeemed");
    Ok(quote)
}

fn find_code<'t>(tables: &'t Tables, code: &str) -> Option<&'t PromoCode> {
    tables.find::<PromoCode, _>(|p| p.code == code)
}

fn lookup<'t>(tables: &'t Tables, code: &str) -> Result<&'t PromoCode> {
    find_code(tables, code).ok_or_else(|| Error::promo(code, "unknown code"))
}

fn check_rules(promo: &PromoCode) -> Result<()> {
    if promo.valid_until.is_some_and(|until| until <= promo.valid_from) {
        return Err(Error::validation_field(
            "valid_until",
            "must be after valid_from",
        ));
    }
    if let Some(limit) = promo.usage_limit {
        validate::positive("usage_limit", limit)?;
    }
    if let Some(limit) = promo.per_user_limit {
        validate::positive("per_user_limit", limit)?;
    }
    Ok(())
}

fn check_plans(tx: &Transaction<'_>, plans: &BTreeSet<PlanId>) -> Result<()> {
    for plan in plans {
        tx.require::<SubscriptionPlan>(*plan)?;
    }
    Ok(())
}

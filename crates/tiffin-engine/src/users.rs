//! User registration and referrals.
//!
//! Every user gets a unique 8-character referral code. A new user who
//! registers with someone else's code creates a pending [`Referral`]; both
//! wallets are credited when the new user completes their first purchase.

use serde::{Deserialize, Serialize};

use tiffin_core::config::ReferralConfig;
use tiffin_core::util::{generate_referral_code, normalize_code, normalize_email};
use tiffin_core::{
    Error, Money, Page, PageRequest, Referral, ReferralStatus, Result, UserAccount, UserId,
    UserSubscription,
};
use tiffin_store::{Store, Tables, Transaction};

use crate::validate;

const CODE_ATTEMPTS: usize = 8;

/// Input for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Full name
    pub name: String,
    /// Email address, unique
    pub email: String,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Another user's referral code
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// A user's referral standing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralSummary {
    /// User
    pub user: UserId,
    /// Code to share
    pub referral_code: String,
    /// Referrals made by this user, newest first
    pub referrals: Vec<Referral>,
    /// Referrals still waiting for a first purchase
    pub pending: usize,
    /// Referrals paid out
    pub rewarded: usize,
    /// Total earned as referrer
    pub total_earned: Money,
    /// Current wallet balance
    pub wallet_balance: Money,
}

/// User accounts and referrals.
#[derive(Clone, Debug)]
pub struct UserService {
    store: Store,
}

impl UserService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registers a user, recording a pending referral if a valid code is given.
    pub fn register(&self, input: NewUser) -> Result<UserAccount> {
        let name = validate::non_empty("name", &input.name)?;
        let email = normalize_email(&input.email)
            .ok_or_else(|| Error::validation_field("email", "is not a valid email address"))?;
        let phone = validate::optional(input.phone);
        let referral_code = validate::optional(input.referral_code).map(|c| normalize_code(&c));

        self.store.write(|tx| {
            if tx
                .tables()
                .find::<UserAccount, _>(|u| u.email == email)
                .is_some()
            {
                return Err(Error::conflict(format!("email {email} is already registered")));
            }
            let referrer = match &referral_code {
                Some(code) => Some(
                    tx.tables()
                        .find::<UserAccount, _>(|u| &u.referral_code == code)
                        .map(|u| u.id)
                        .ok_or_else(|| {
                            Error::validation_field("referral_code", "unknown referral code")
                        })?,
                ),
                None => None,
            };

            let mut user = UserAccount::new(name, email, unique_code(tx.tables())?);
            user.phone = phone;
            user.referred_by = referrer;
            tx.insert(user.clone())?;

            if let (Some(referrer), Some(code)) = (referrer, referral_code) {
                let referral = Referral::new(referrer, user.id, code);
                tracing::info!(referrer = %referrer, referee = %user.id, "Referral recorded");
                tx.insert(referral)?;
            }
            tracing::info!(user = %user.id, "User registered");
            Ok(user)
        })
    }

    /// Fetches a user.
    pub fn get(&self, id: UserId) -> Result<UserAccount> {
        self.store.read(|t| t.require::<UserAccount>(id).cloned())?
    }

    /// Lists users, newest first.
    pub fn list(&self, page: PageRequest) -> Result<Page<UserAccount>> {
        self.store.read(|t| {
            t.page(
                |_: &UserAccount| true,
                |a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)),
                page,
            )
        })
    }

    /// Referral standing of `user`.
    pub fn referral_summary(&self, user: UserId) -> Result<ReferralSummary> {
        self.store.read(|t| {
            let account = t.require::<UserAccount>(user)?;
            let mut referrals: Vec<Referral> = t
                .iter::<Referral>()
                .filter(|r| r.referrer == user)
                .cloned()
                .collect();
            referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let rewarded = referrals
                .iter()
                .filter(|r| r.status == ReferralStatus::Rewarded)
                .count();
            let total_earned = referrals
                .iter()
                .fold(Money::ZERO, |acc, r| acc + r.referrer_reward);
            Ok(ReferralSummary {
                user,
                referral_code: account.referral_code.clone(),
                pending: referrals.len() - rewarded,
                rewarded,
                total_earned,
                wallet_balance: account.wallet_balance,
                referrals,
            })
        })?
    }
}

fn unique_code(tables: &Tables) -> Result<String> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_referral_code();
        if tables
            .find::<UserAccount, _>(|u| u.referral_code == code)
            .is_none()
        {
            return Ok(code);
        }
    }
    Err(Error::storage("could not generate a unique referral code"))
}

/// Pays out `referee`'s pending referral if this is their first purchase.
///
/// Runs inside the purchase transaction, after the new subscription has
/// been inserted. Returns `true` if rewards were paid.
pub(crate) fn reward_first_purchase(
    tx: &mut Transaction<'_>,
    referee: UserId,
    rewards: &ReferralConfig,
) -> Result<bool> {
    let purchases = tx
        .tables()
        .iter::<UserSubscription>()
        .filter(|s| s.user == referee)
        .count();
    if purchases != 1 {
        return Ok(false);
    }
    let Some(mut referral) = tx
        .tables()
        .find::<Referral, _>(|r| r.referee == referee && r.status == ReferralStatus::Pending)
        .cloned()
    else {
        return Ok(false);
    };

    referral.mark_rewarded(rewards.referrer_reward, rewards.referee_reward);
    tx.update::<UserAccount, _, _>(referral.referrer, |u| {
        u.credit_wallet(rewards.referrer_reward);
        Ok(())
    })?;
    tx.update::<UserAccount, _, _>(referee, |u| {
        u.credit_wallet(rewards.referee_reward);
        Ok(())
    })?;
    tracing::info!(
        referral = %referral.id,
        referrer = %referral.referrer,
        referee = %referee,
        "Referral rewarded"
    );
    tx.put(referral);
    Ok(true)
}

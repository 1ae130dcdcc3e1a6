//! Platform user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Money, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Lower-case email, unique across users
    pub email: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// This user's own referral code
    pub referral_code: String,
    /// User whose code was used at registration
    pub referred_by: Option<UserId>,
    /// Wallet balance from referral rewards
    pub wallet_balance: Money,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account with an empty wallet.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        referral_code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            phone: None,
            referral_code: referral_code.into(),
            referred_by: None,
            wallet_balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a reward to the wallet.
    pub fn credit_wallet(&mut self, amount: Money) {
        self.wallet_balance = self.wallet_balance + amount;
        self.updated_at = Utc::now();
    }
}

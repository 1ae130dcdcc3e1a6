//! Referrals between users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Money, ReferralId, UserId};

/// Reward state of a referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    /// Referee registered but has not purchased yet.
    Pending,
    /// Rewards paid out.
    Rewarded,
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferralStatus::Pending => write!(f, "pending"),
            ReferralStatus::Rewarded => write!(f, "rewarded"),
        }
    }
}

/// One user referring another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    /// Unique identifier
    pub id: ReferralId,
    /// User who shared the code
    pub referrer: UserId,
    /// User who registered with the code
    pub referee: UserId,
    /// Code used
    pub code: String,
    /// Reward state
    pub status: ReferralStatus,
    /// Credited to the referrer
    pub referrer_reward: Money,
    /// Credited to the referee
    pub referee_reward: Money,
    /// When rewards were paid
    pub rewarded_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Referral {
    /// Creates a pending referral.
    pub fn new(referrer: UserId, referee: UserId, code: impl Into<String>) -> Self {
        Self {
            id: ReferralId::new(),
            referrer,
            referee,
            code: code.into(),
            status: ReferralStatus::Pending,
            referrer_reward: Money::ZERO,
            referee_reward: Money::ZERO,
            rewarded_at: None,
            created_at: Utc::now(),
        }
    }

    /// Records the payout. Returns `false` if already rewarded.
    pub fn mark_rewarded(&mut self, referrer_reward: Money, referee_reward: Money) -> bool {
        if self.status == ReferralStatus::Rewarded {
            return false;
        }
        self.status = ReferralStatus::Rewarded;
        self.referrer_reward = referrer_reward;
        self.referee_reward = referee_reward;
        self.rewarded_at = Some(Utc::now());
        true
    }
}

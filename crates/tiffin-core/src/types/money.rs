//! Money amounts in integer minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// An amount of money in minor units (paise).
///
/// Arithmetic never goes negative: subtraction saturates at zero.
///
/// # Examples
///
/// ```
/// use tiffin_core::Money;
///
/// let price = Money::from_minor(49_900);
/// assert_eq!(price.percent(10), Money::from_minor(4_990));
/// assert_eq!(price.to_string(), "499.00");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// Creates an amount from minor units.
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtracts, stopping at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Returns `percent`% of this amount, rounded down.
    pub fn percent(self, percent: u8) -> Money {
        Money(self.0.saturating_mul(u64::from(percent)) / 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

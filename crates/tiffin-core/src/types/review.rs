//! Vendor reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{OrderId, ReviewId, UserId, VendorId};

/// Lowest allowed rating.
pub const MIN_RATING: u8 = 1;

/// Highest allowed rating.
pub const MAX_RATING: u8 = 5;

/// A user's rating of a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: ReviewId,
    /// Reviewer
    pub user: UserId,
    /// Vendor reviewed
    pub vendor: VendorId,
    /// Order the review is about, if any
    pub order: Option<OrderId>,
    /// Stars, 1..=5
    pub rating: u8,
    /// Free-text comment
    pub comment: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Creates a review after checking the rating range.
    pub fn new(
        user: UserId,
        vendor: VendorId,
        order: Option<OrderId>,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Self> {
        check_rating(rating)?;
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::new(),
            user,
            vendor,
            order,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Rejects ratings outside 1..=5.
pub fn check_rating(rating: u8) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(Error::validation_field(
            "rating",
            format!("must be between {MIN_RATING} and {MAX_RATING}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(check_rating(0).is_err());
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert!(check_rating(6).is_err());
        assert!(Review::new(UserId::new(), VendorId::new(), None, 9, None).is_err());
    }
}

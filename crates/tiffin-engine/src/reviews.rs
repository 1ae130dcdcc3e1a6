//! Vendor reviews.
//!
//! Every change to a review updates the vendor's [`RatingSummary`] in the
//! same transaction, so the aggregate always equals the stored reviews.
//!
//! [`RatingSummary`]: tiffin_core::RatingSummary

use chrono::Utc;
use serde::Deserialize;

use tiffin_core::{
    Error, Order, OrderId, OrderStatus, Page, PageRequest, Result, Review, ReviewId, UserAccount,
    UserId, UserSubscription, VendorId, VendorProfile, check_rating,
};
use tiffin_store::{Store, Transaction};

use crate::validate;

/// Input for submitting a review.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Reviewer
    pub user: UserId,
    /// Vendor reviewed
    pub vendor: VendorId,
    /// Delivered order being reviewed
    #[serde(default)]
    pub order: Option<OrderId>,
    /// Stars, 1..=5
    pub rating: u8,
    /// Free-text comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Edit of a review by its author.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewUpdate {
    /// Author; only they may edit
    pub user: UserId,
    /// New rating
    #[serde(default)]
    pub rating: Option<u8>,
    /// New comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Listing filter for reviews.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFilter {
    /// Reviews of this vendor
    pub vendor: Option<VendorId>,
    /// Reviews by this user
    pub user: Option<UserId>,
    /// At least this many stars
    pub min_rating: Option<u8>,
}

/// Review submission and rating upkeep.
#[derive(Clone, Debug)]
pub struct ReviewService {
    store: Store,
}

impl ReviewService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Submits a review after checking the user may review the vendor.
    pub fn submit(&self, input: NewReview) -> Result<Review> {
        let review = Review::new(
            input.user,
            input.vendor,
            input.order,
            input.rating,
            validate::optional(input.comment),
        )?;
        self.store.write(|tx| {
            tx.require::<UserAccount>(review.user)?;
            tx.require::<VendorProfile>(review.vendor)?;
            match review.order {
                Some(order) => check_order_review(tx, &review, order)?,
                None => check_vendor_review(tx, &review)?,
            }
            tx.insert(review.clone())?;
            tx.update::<VendorProfile, _, _>(review.vendor, |v| {
                v.rating.add(review.rating);
                v.touch();
                Ok(())
            })?;
            tracing::info!(
                review = %review.id,
                vendor = %review.vendor,
                rating = review.rating,
                "Review submitted"
            );
            Ok(review)
        })
    }

    /// Edits a review's rating or comment.
    pub fn update(&self, id: ReviewId, update: ReviewUpdate) -> Result<Review> {
        if let Some(rating) = update.rating {
            check_rating(rating)?;
        }
        self.store.write(|tx| {
            let old = tx.require::<Review>(id)?.clone();
            if old.user != update.user {
                return Err(Error::conflict(format!(
                    "review {id} was not written by user {}",
                    update.user
                )));
            }
            let review = tx.update::<Review, _, _>(id, |r| {
                if let Some(rating) = update.rating {
                    r.rating = rating;
                }
                if update.comment.is_some() {
                    r.comment = validate::optional(update.comment);
                }
                r.updated_at = Utc::now();
                Ok(r.clone())
            })?;
            if review.rating != old.rating {
                tx.update::<VendorProfile, _, _>(review.vendor, |v| {
                    v.rating.replace(old.rating, review.rating);
                    v.touch();
                    Ok(())
                })?;
            }
            Ok(review)
        })
    }

    /// Deletes a review on behalf of its author.
    pub fn delete(&self, id: ReviewId, user: UserId) -> Result<Review> {
        self.store.write(|tx| {
            let review = tx.require::<Review>(id)?;
            if review.user != user {
                return Err(Error::conflict(format!(
                    "review {id} was not written by user {user}"
                )));
            }
            let review = tx.remove::<Review>(id)?;
            if tx.get::<VendorProfile>(review.vendor).is_some() {
                tx.update::<VendorProfile, _, _>(review.vendor, |v| {
                    v.rating.remove(review.rating);
                    v.touch();
                    Ok(())
                })?;
            }
            tracing::info!(review = %id, vendor = %review.vendor, "Review deleted");
            Ok(review)
        })
    }

    /// Fetches a review.
    pub fn get(&self, id: ReviewId) -> Result<Review> {
        self.store.read(|t| t.require::<Review>(id).cloned())?
    }

    /// Lists reviews, newest first.
    pub fn list(&self, filter: &ReviewFilter, page: PageRequest) -> Result<Page<Review>> {
        self.store.read(|t| {
            t.page(
                |r: &Review| {
                    filter.vendor.is_none_or(|v| r.vendor == v)
                        && filter.user.is_none_or(|u| r.user == u)
                        && filter.min_rating.is_none_or(|m| r.rating >= m)
                },
                |a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)),
                page,
            )
        })
    }
}

fn check_order_review(tx: &Transaction<'_>, review: &Review, order: OrderId) -> Result<()> {
    let found = tx.require::<Order>(order)?;
    if found.user != review.user || found.vendor != review.vendor {
        return Err(Error::conflict(format!(
            "order {order} was not delivered to this user by this vendor"
        )));
    }
    if found.status != OrderStatus::Delivered {
        return Err(Error::conflict(format!(
            "order {order} is {}; only delivered orders can be reviewed",
            found.status
        )));
    }
    if tx
        .tables()
        .find::<Review, _>(|r| r.order == Some(order))
        .is_some()
    {
        return Err(Error::conflict(format!("order {order} is already reviewed")));
    }
    Ok(())
}

fn check_vendor_review(tx: &Transaction<'_>, review: &Review) -> Result<()> {
    let served = tx.tables().iter::<UserSubscription>().any(|s| {
        s.user == review.user
            && (s.vendor == Some(review.vendor)
                || s.switch_history.iter().any(|sw| sw.from == review.vendor))
    });
    if !served {
        return Err(Error::conflict(format!(
            "user {} has never been served by vendor {}",
            review.user, review.vendor
        )));
    }
    let existing = tx.tables().find::<Review, _>(|r| {
        r.order.is_none() && r.user == review.user && r.vendor == review.vendor
    });
    if let Some(existing) = existing {
        return Err(Error::conflict(format!(
            "user already reviewed this vendor in review {}",
            existing.id
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiffin_core::{FoodType, MealType, SubscriptionId, VendorCategory};

    struct Fixture {
        store: Store,
        reviews: ReviewService,
        user: UserId,
        vendor: VendorId,
    }

    fn fixture() -> Fixture {
        let store = Store::in_memory();
        let user = UserAccount::new("Ravi", "ravi@example.com", "RAVI0001");
        let vendor = VendorProfile::new(
            UserId::new(),
            "Tiffin Box",
            VendorCategory::Restaurant,
            FoodType::Veg,
            20,
        );
        let (user_id, vendor_id) = (user.id, vendor.id);
        store
            .write(|tx| {
                tx.insert(user)?;
                tx.insert(vendor)
            })
            .unwrap();
        Fixture {
            reviews: ReviewService::new(store.clone()),
            store,
            user: user_id,
            vendor: vendor_id,
        }
    }

    fn delivered_order(fx: &Fixture) -> OrderId {
        let mut order = Order::new(
            fx.user,
            SubscriptionId::new(),
            fx.vendor,
            MealType::Lunch,
            Utc::now().date_naive(),
        );
        order.status = OrderStatus::Delivered;
        fx.store.write(|tx| tx.insert(order)).unwrap()
    }

    fn review(fx: &Fixture, order: Option<OrderId>, rating: u8) -> NewReview {
        NewReview {
            user: fx.user,
            vendor: fx.vendor,
            order,
            rating,
            comment: Some("Good dal".into()),
        }
    }

    fn summary(fx: &Fixture) -> (u32, f64) {
        fx.store
            .read(|t| {
                let r = t.vendors[&fx.vendor].rating;
                (r.count, r.average)
            })
            .unwrap()
    }

    #[test]
    fn test_rating_summary_stays_exact() {
        let fx = fixture();
        let first = fx
            .reviews
            .submit(review(&fx, Some(delivered_order(&fx)), 5))
            .unwrap();
        fx.reviews
            .submit(review(&fx, Some(delivered_order(&fx)), 2))
            .unwrap();
        assert_eq!(summary(&fx), (2, 3.5));

        fx.reviews
            .update(
                first.id,
                ReviewUpdate {
                    user: fx.user,
                    rating: Some(4),
                    comment: None,
                },
            )
            .unwrap();
        assert_eq!(summary(&fx), (2, 3.0));

        fx.reviews.delete(first.id, fx.user).unwrap();
        assert_eq!(summary(&fx), (1, 2.0));
    }

    #[test]
    fn test_one_review_per_order() {
        let fx = fixture();
        let order = delivered_order(&fx);
        fx.reviews.submit(review(&fx, Some(order), 4)).unwrap();
        assert!(matches!(
            fx.reviews.submit(review(&fx, Some(order), 3)),
            Err(Error::Conflict { .. })
        ));
    }

    #[test]
    fn test_undelivered_order_rejected() {
        let fx = fixture();
        let order = Order::new(
            fx.user,
            SubscriptionId::new(),
            fx.vendor,
            MealType::Dinner,
            Utc::now().date_naive(),
        );
        let id = fx.store.write(|tx| tx.insert(order)).unwrap();
        assert!(fx.reviews.submit(review(&fx, Some(id), 4)).is_err());
        assert_eq!(summary(&fx), (0, 0.0));
    }

    #[test]
    fn test_order_less_review_requires_service() {
        let fx = fixture();
        assert!(fx.reviews.submit(review(&fx, None, 4)).is_err());
    }

    #[test]
    fn test_rating_range_and_ownership() {
        let fx = fixture();
        assert!(matches!(
            fx.reviews.submit(review(&fx, Some(delivered_order(&fx)), 6)),
            Err(Error::Validation { .. })
        ));
        let posted = fx
            .reviews
            .submit(review(&fx, Some(delivered_order(&fx)), 3))
            .unwrap();
        assert!(fx.reviews.delete(posted.id, UserId::new()).is_err());
        assert_eq!(summary(&fx), (1, 3.0));
    }
}

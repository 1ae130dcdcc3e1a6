//! Meal orders placed against subscriptions.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use tiffin_core::{
    Error, MealType, Order, OrderId, OrderStatus, Page, PageRequest, Result, SubscriptionId,
    SubscriptionStatus, UserId, UserSubscription, VendorId, VendorProfile,
};
use tiffin_store::{Store, Transaction};

use crate::subscriptions::end_subscription;

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    /// Subscription paying for the meal
    pub subscription: SubscriptionId,
    /// Meal slot
    pub meal_type: MealType,
    /// Delivery date
    pub delivery_date: NaiveDate,
}

/// Listing filter for orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Only this subscriber's
    pub user: Option<UserId>,
    /// Only for this subscription
    pub subscription: Option<SubscriptionId>,
    /// Only for this vendor
    pub vendor: Option<VendorId>,
    /// Only in this state
    pub status: Option<OrderStatus>,
    /// Only for this date
    pub delivery_date: Option<NaiveDate>,
}

/// Order placement and tracking.
#[derive(Clone, Debug)]
pub struct OrderService {
    store: Store,
}

impl OrderService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Places an order, consuming one credit.
    ///
    /// The subscription expires when its last credit is used.
    pub fn place(&self, input: NewOrder) -> Result<Order> {
        let today = Utc::now().date_naive();
        if input.delivery_date < today {
            return Err(Error::validation_field(
                "delivery_date",
                "must not be in the past",
            ));
        }
        self.store.write(|tx| {
            let sub = tx.require::<UserSubscription>(input.subscription)?.clone();
            if sub.status != SubscriptionStatus::Active {
                return Err(Error::conflict(format!(
                    "cannot order on a {} subscription",
                    sub.status
                )));
            }
            let Some(vendor) = sub.vendor else {
                return Err(Error::conflict(format!(
                    "subscription {} has no vendor assigned yet",
                    sub.id
                )));
            };
            if !sub.delivery.meal_types.contains(&input.meal_type) {
                return Err(Error::validation_field(
                    "meal_type",
                    format!("{} is not part of this subscription", input.meal_type),
                ));
            }
            if !sub.covers_date(input.delivery_date) {
                return Err(Error::validation_field(
                    "delivery_date",
                    format!(
                        "must be between {} and {}",
                        sub.start_date, sub.end_date
                    ),
                ));
            }
            let duplicate = tx.tables().find::<Order, _>(|o| {
                o.subscription == sub.id
                    && o.delivery_date == input.delivery_date
                    && o.meal_type == input.meal_type
                    && o.status != OrderStatus::Cancelled
            });
            if let Some(existing) = duplicate {
                return Err(Error::conflict(format!(
                    "order {} already covers {} on {}",
                    existing.id, input.meal_type, input.delivery_date
                )));
            }

            let remaining = tx.update::<UserSubscription, _, _>(sub.id, |s| {
                s.consume_credit()?;
                Ok(s.credits_remaining())
            })?;
            let order = Order::new(
                sub.user,
                sub.id,
                vendor,
                input.meal_type,
                input.delivery_date,
            );
            tx.insert(order.clone())?;
            tracing::info!(
                order = %order.id,
                subscription = %sub.id,
                vendor = %vendor,
                date = %order.delivery_date,
                credits_remaining = remaining,
                "Order placed"
            );
            if remaining == 0 {
                end_subscription(tx, sub.id, SubscriptionStatus::Expired, "credits exhausted")?;
            }
            Ok(order)
        })
    }

    /// Moves an order to `status`. Cancellation refunds the credit.
    pub fn advance(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        if status == OrderStatus::Cancelled {
            return self.cancel(id);
        }
        self.store.write(|tx| {
            let order = tx.update::<Order, _, _>(id, |o| {
                o.transition(status)?;
                Ok(o.clone())
            })?;
            tracing::info!(order = %id, status = %status, "Order status changed");
            Ok(order)
        })
    }

    /// Cancels a placed or confirmed order and refunds its credit.
    pub fn cancel(&self, id: OrderId) -> Result<Order> {
        let today = Utc::now().date_naive();
        self.store.write(|tx| {
            let order = tx.update::<Order, _, _>(id, |o| {
                o.transition(OrderStatus::Cancelled)?;
                Ok(o.clone())
            })?;
            let sub = tx.update::<UserSubscription, _, _>(order.subscription, |s| {
                for _ in 0..order.credits_used {
                    s.refund_credit();
                }
                Ok(s.clone())
            })?;
            let reactivated = sub.can_reactivate(today) && reactivate(tx, &sub, today)?;
            tracing::info!(
                order = %id,
                subscription = %sub.id,
                reactivated,
                "Order cancelled"
            );
            Ok(order)
        })
    }

    /// Fetches an order.
    pub fn get(&self, id: OrderId) -> Result<Order> {
        self.store.read(|t| t.require::<Order>(id).cloned())?
    }

    /// Lists orders by delivery date, latest first.
    pub fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        self.store.read(|t| {
            t.page(
                |o: &Order| {
                    filter.user.is_none_or(|u| o.user == u)
                        && filter.subscription.is_none_or(|s| o.subscription == s)
                        && filter.vendor.is_none_or(|v| o.vendor == v)
                        && filter.status.is_none_or(|s| o.status == s)
                        && filter.delivery_date.is_none_or(|d| o.delivery_date == d)
                },
                |a, b| {
                    b.delivery_date
                        .cmp(&a.delivery_date)
                        .then_with(|| a.meal_type.cmp(&b.meal_type))
                        .then_with(|| a.id.cmp(&b.id))
                },
                page,
            )
        })
    }
}

/// Brings a credit-exhausted subscription back if its vendor still has room.
fn reactivate(
    tx: &mut Transaction<'_>,
    sub: &UserSubscription,
    today: NaiveDate,
) -> Result<bool> {
    if let Some(vendor) = sub.vendor {
        let has_room = tx
            .get::<VendorProfile>(vendor)
            .is_some_and(|v| v.capacity.available() > 0);
        if !has_room {
            return Ok(false);
        }
        tx.update::<VendorProfile, _, _>(vendor, |v| {
            v.capacity.reserve();
            v.touch();
            Ok(())
        })?;
    }
    tx.update::<UserSubscription, _, _>(sub.id, |s| s.reactivate_after_refund(today))?;
    Ok(true)
}

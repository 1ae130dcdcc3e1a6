//! Meal orders placed against a subscription.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{MealType, OrderId, SubscriptionId, UserId, VendorId};

/// Delivery progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by the subscriber.
    Placed,
    /// Accepted by the vendor.
    Confirmed,
    /// Being cooked.
    Preparing,
    /// With the rider.
    OutForDelivery,
    /// Handed over.
    Delivered,
    /// Cancelled before dispatch.
    Cancelled,
}

impl OrderStatus {
    /// Returns `true` for Delivered and Cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns `true` while the order can still be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Confirmed)
    }

    /// The single forward step from this status, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `self -> next` is allowed.
    ///
    /// Orders move forward one step at a time, or are cancelled from
    /// Placed / Confirmed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return self.is_cancellable();
        }
        self.next() == Some(next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Placed => write!(f, "placed"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::OutForDelivery => write!(f, "out_for_delivery"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single meal delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,
    /// Subscriber
    pub user: UserId,
    /// Subscription paying for the meal
    pub subscription: SubscriptionId,
    /// Vendor cooking the meal
    pub vendor: VendorId,
    /// Meal slot
    pub meal_type: MealType,
    /// Delivery date
    pub delivery_date: NaiveDate,
    /// Delivery progress
    pub status: OrderStatus,
    /// Credits charged to the subscription
    pub credits_used: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a placed order costing one credit.
    pub fn new(
        user: UserId,
        subscription: SubscriptionId,
        vendor: VendorId,
        meal_type: MealType,
        delivery_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user,
            subscription,
            vendor,
            meal_type,
            delivery_date,
            status: OrderStatus::Placed,
            credits_used: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `next`, enforcing the state machine.
    pub fn transition(&mut self, next: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::transition("order", self.status, next));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

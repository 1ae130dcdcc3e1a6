//! Unique identifier types for Tiffin records.
//!
//! Every record kind gets its own UUID newtype so that a `VendorId` can never
//! be passed where a `SubscriptionId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from a UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Converts to the inner UUID.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a platform user.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::UserId;
    ///
    /// let id = UserId::new();
    /// let parsed: UserId = id.to_string().parse().unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    UserId
);
uuid_id!(
    /// Identifier of a location zone.
    ZoneId
);
uuid_id!(
    /// Identifier of a vendor profile.
    VendorId
);
uuid_id!(
    /// Identifier of a subscription plan.
    PlanId
);
uuid_id!(
    /// Identifier of a vendor menu.
    MenuId
);
uuid_id!(
    /// Identifier of a purchased user subscription.
    SubscriptionId
);
uuid_id!(
    /// Identifier of a meal order.
    OrderId
);
uuid_id!(
    /// Identifier of a promo code record.
    PromoCodeId
);
uuid_id!(
    /// Identifier of a vendor review.
    ReviewId
);
uuid_id!(
    /// Identifier of a referral.
    ReferralId
);
uuid_id!(
    /// Identifier of a vendor assignment request.
    RequestId
);

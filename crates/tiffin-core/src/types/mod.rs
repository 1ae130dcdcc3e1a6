//! Core types for the Tiffin platform.

mod assignment;
mod food;
mod ids;
mod menu;
mod money;
mod order;
mod page;
mod plan;
mod promo;
mod proptests;
mod referral;
mod review;
mod subscription;
mod user;
mod vendor;
mod zone;

pub use assignment::{AssignmentRequestKind, AssignmentStatus, Priority, VendorAssignmentRequest};
pub use food::{FoodType, MealType};
pub use ids::{
    MenuId, OrderId, PlanId, PromoCodeId, ReferralId, RequestId, ReviewId, SubscriptionId, UserId,
    VendorId, ZoneId,
};
pub use menu::{Menu, MenuItem};
pub use money::Money;
pub use order::{Order, OrderStatus};
pub use page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageRequest};
pub use plan::SubscriptionPlan;
pub use promo::{Discount, PromoCode, PromoQuote};
pub use referral::{Referral, ReferralStatus};
pub use review::{MAX_RATING, MIN_RATING, Review, check_rating};
pub use subscription::{
    DeliveryDetails, PriceBreakdown, SubscriptionStatus, UserSubscription, VendorSwitch,
};
pub use user::UserAccount;
pub use vendor::{RatingSummary, VendorCapacity, VendorCategory, VendorProfile};
pub use zone::LocationZone;

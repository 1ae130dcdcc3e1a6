#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Tiffin Core Library
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`types`]: Domain records, IDs, money, pagination
//! - [`config`]: `TiffinConfig` loading and environment overrides
//! - [`service`]: Service lifecycle state
//! - [`util`]: Code and pincode normalization helpers

pub mod config;
pub mod error;
pub mod service;
pub mod types;
pub mod util;

// Re-exports for convenience
pub use config::TiffinConfig;
pub use error::{Error, Result};
pub use service::{ServiceHandle, ServiceState};
pub use types::{
    AssignmentRequestKind, AssignmentStatus, DEFAULT_PAGE_LIMIT, DeliveryDetails, Discount,
    FoodType, LocationZone, MAX_PAGE_LIMIT, MAX_RATING, MIN_RATING, MealType, Menu, MenuId,
    MenuItem, Money, Order, OrderId, OrderStatus, Page, PageRequest, PlanId, PriceBreakdown,
    Priority, PromoCode, PromoCodeId, PromoQuote, RatingSummary, Referral, ReferralId,
    ReferralStatus, RequestId, Review, ReviewId, SubscriptionId, SubscriptionPlan,
    SubscriptionStatus, UserAccount, UserId, UserSubscription, VendorAssignmentRequest,
    VendorCapacity, VendorCategory, VendorId, VendorProfile, VendorSwitch, ZoneId, check_rating,
};

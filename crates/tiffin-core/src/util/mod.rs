//! Utility functions for Tiffin.
//!
//! - [`codes`]: Promo / referral code, pincode, and email normalization

pub mod codes;

pub use codes::{generate_referral_code, is_valid_pincode, normalize_code, normalize_email};

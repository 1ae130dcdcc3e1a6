//! Code normalization utilities.
//!
//! Promo codes and referral codes are compared case-insensitively and without
//! whitespace, so every code is normalized before it is stored or looked up.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

#[allow(clippy::expect_used)]
static PINCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid pincode regex"));

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"));

/// Length of generated referral codes.
pub const REFERRAL_CODE_LEN: usize = 8;

/// Normalize a promo or referral code to upper-case with no whitespace.
///
/// # Examples
///
/// ```
/// use tiffin_core::util::normalize_code;
///
/// assert_eq!(normalize_code(" welcome 50 "), "WELCOME50");
/// assert_eq!(normalize_code("Save_10"), "SAVE_10");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.split_whitespace()
        .collect::<String>()
        .to_uppercase()
}

/// Returns `true` for a 6-digit pincode that does not start with zero.
///
/// # Examples
///
/// ```
/// use tiffin_core::util::is_valid_pincode;
///
/// assert!(is_valid_pincode("560001"));
/// assert!(!is_valid_pincode("060001"));
/// assert!(!is_valid_pincode("56001"));
/// ```
pub fn is_valid_pincode(pincode: &str) -> bool {
    PINCODE.is_match(pincode)
}

/// Normalize an email to trimmed lower-case, returning `None` if it is not
/// shaped like an address.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    EMAIL.is_match(&email).then_some(email)
}

/// Generate a random upper-case alphanumeric referral code.
pub fn generate_referral_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(REFERRAL_CODE_LEN)
        .collect::<String>()
        .to_uppercase()
}

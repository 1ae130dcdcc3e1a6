//! Input checks shared by the services.

use tiffin_core::util::is_valid_pincode;
use tiffin_core::{Error, Result};

/// Trims `value`, rejecting it if empty.
pub(crate) fn non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_field(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional value, mapping blank to `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks and trims a 6-digit pincode.
pub(crate) fn pincode(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_valid_pincode(trimmed) {
        return Err(Error::validation_field(field, "must be a 6-digit pincode"));
    }
    Ok(trimmed.to_string())
}

/// Rejects zero.
pub(crate) fn positive(field: &str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(Error::validation_field(field, "must be greater than zero"));
    }
    Ok(value)
}

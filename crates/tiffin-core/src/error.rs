//! Error types for the Tiffin core library.

/// Errors that can occur across Tiffin operations.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A record lookup failed.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (e.g. "vendor", "subscription")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Input validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The operation conflicts with current state (duplicates, ownership, etc.)
    #[error("Conflict: {message}")]
    Conflict {
        /// What conflicted
        message: String,
    },

    /// A status change that the record's state machine does not allow.
    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Kind of record
        entity: &'static str,
        /// Current state
        from: String,
        /// Requested state
        to: String,
    },

    /// Vendor has no free subscriber slots.
    #[error("Vendor {vendor} has no remaining capacity")]
    CapacityExhausted {
        /// Vendor identifier
        vendor: String,
    },

    /// No vendor satisfies the constraints of an assignment request.
    #[error("No eligible vendor for assignment request {request}")]
    NoEligibleVendor {
        /// Request identifier
        request: String,
    },

    /// Promo code cannot be applied.
    #[error("Promo code {code} rejected: {reason}")]
    PromoRejected {
        /// Normalized promo code
        code: String,
        /// Why it was rejected
        reason: String,
    },

    /// Storage backend failure
    #[error("Storage error: {message}")]
    Storage {
        /// What failed
        message: String,
    },

    /// I/O error (snapshot files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for Tiffin operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable category, used in API error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation { .. } => "validation",
            Error::Conflict { .. } => "conflict",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::CapacityExhausted { .. } => "capacity_exhausted",
            Error::NoEligibleVendor { .. } => "no_eligible_vendor",
            Error::PromoRejected { .. } => "promo_rejected",
            Error::Storage { .. } | Error::Io(_) | Error::Serialization(_) => "storage",
            Error::Config { .. } => "config",
        }
    }

    /// Whether the caller caused this error (vs. a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Validation { .. }
                | Error::Conflict { .. }
                | Error::InvalidTransition { .. }
                | Error::CapacityExhausted { .. }
                | Error::NoEligibleVendor { .. }
                | Error::PromoRejected { .. }
        )
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Conflict {
            message: message.into(),
        }
    }

    /// Creates an invalid transition error.
    pub fn transition(entity: &'static str, from: impl ToString, to: impl ToString) -> Self {
        Error::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates a promo rejection.
    pub fn promo(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PromoRejected {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

//! HTTP error mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Failure reported by the engine
    #[error(transparent)]
    Engine(#[from] tiffin_core::Error),

    /// Body was not valid JSON for the endpoint
    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),

    /// Query string could not be parsed
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// Path parameter could not be parsed
    #[error("Invalid path parameter: {0}")]
    Path(#[from] PathRejection),

    /// Blocking engine task panicked or was cancelled
    #[error("Engine task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        use tiffin_core::Error as E;
        match self {
            ApiError::Engine(e) => match e {
                E::NotFound { .. } => StatusCode::NOT_FOUND,
                E::Validation { .. } | E::PromoRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                E::Conflict { .. }
                | E::InvalidTransition { .. }
                | E::CapacityExhausted { .. }
                | E::NoEligibleVendor { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Json(r) => r.status(),
            ApiError::Query(r) => r.status(),
            ApiError::Path(r) => r.status(),
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.category(),
            ApiError::Json(_) | ApiError::Query(_) | ApiError::Path(_) => "invalid_request",
            ApiError::Join(_) => "internal",
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            ApiError::Engine(tiffin_core::Error::Validation { field, .. }) => field.as_deref(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let mut error = json!({
            "category": self.category(),
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            error["field"] = json!(field);
        }
        (status, Json(json!({ "error": error }))).into_response()
    }
}

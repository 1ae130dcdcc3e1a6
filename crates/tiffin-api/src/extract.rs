//! Extractors whose rejections use the API error body.

use axum::extract::{FromRequest, FromRequestParts};
use serde::Deserialize;
use tiffin_core::PageRequest;

use crate::error::ApiError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `page` and `limit` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paging {
    /// Page number, 1-indexed
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl Paging {
    /// Clamped page request.
    pub fn request(self) -> PageRequest {
        PageRequest::from_optional(self.page, self.limit)
    }
}

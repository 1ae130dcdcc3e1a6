use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use tiffin_core::{Page, Review, ReviewId, UserId, VendorId};
use tiffin_engine::reviews::{NewReview, ReviewFilter, ReviewUpdate};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct ReviewQuery {
    vendor: Option<VendorId>,
    user: Option<UserId>,
    min_rating: Option<u8>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ReviewQuery>,
) -> ApiResult<Json<Page<Review>>> {
    let filter = ReviewFilter {
        vendor: q.vendor,
        user: q.user,
        min_rating: q.min_rating,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.reviews().list(&filter, page))
            .await?,
    ))
}

pub(super) async fn submit(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewReview>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = state.run(|engine| engine.reviews().submit(input)).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.run(move |engine| engine.reviews().get(id)).await?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
    ApiJson(update): ApiJson<ReviewUpdate>,
) -> ApiResult<Json<Review>> {
    Ok(Json(
        state
            .run(move |engine| engine.reviews().update(id, update))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorQuery {
    user: UserId,
}

pub(super) async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
    ApiQuery(q): ApiQuery<AuthorQuery>,
) -> ApiResult<Json<Review>> {
    Ok(Json(
        state
            .run(move |engine| engine.reviews().delete(id, q.user))
            .await?,
    ))
}

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use tiffin_core::{Page, SubscriptionId, SubscriptionStatus, UserId, UserSubscription, VendorId};
use tiffin_engine::subscriptions::{Purchase, PurchaseReceipt, SubscriptionFilter};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct SubscriptionQuery {
    user: Option<UserId>,
    status: Option<SubscriptionStatus>,
    vendor: Option<VendorId>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SubscriptionQuery>,
) -> ApiResult<Json<Page<UserSubscription>>> {
    let filter = SubscriptionFilter {
        user: q.user,
        status: q.status,
        vendor: q.vendor,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.subscriptions().list(&filter, page))
            .await?,
    ))
}

pub(super) async fn purchase(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Purchase>,
) -> ApiResult<(StatusCode, Json<PurchaseReceipt>)> {
    let receipt = state
        .run(|engine| engine.subscriptions().purchase(input))
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> ApiResult<Json<UserSubscription>> {
    Ok(Json(state.run(move |engine| engine.subscriptions().get(id)).await?))
}

pub(super) async fn pause(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> ApiResult<Json<UserSubscription>> {
    Ok(Json(state.run(move |engine| engine.subscriptions().pause(id)).await?))
}

pub(super) async fn resume(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> ApiResult<Json<UserSubscription>> {
    Ok(Json(
        state
            .run(move |engine| engine.subscriptions().resume(id))
            .await?,
    ))
}

pub(super) async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> ApiResult<Json<UserSubscription>> {
    Ok(Json(
        state
            .run(move |engine| engine.subscriptions().cancel(id))
            .await?,
    ))
}

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use tiffin_core::{Money, Page, PlanId, PromoCode, PromoCodeId, PromoQuote, UserId};
use tiffin_engine::promos::{NewPromo, PromoUpdate};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct PromoQuery {
    #[serde(default)]
    active_only: bool,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<PromoQuery>,
) -> ApiResult<Json<Page<PromoCode>>> {
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let (active_only, page) = (q.active_only, paging.request());
    Ok(Json(
        state
            .run(move |engine| engine.promos().list(active_only, page))
            .await?,
    ))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPromo>,
) -> ApiResult<(StatusCode, Json<PromoCode>)> {
    let promo = state.run(|engine| engine.promos().create(input)).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PromoCodeId>,
) -> ApiResult<Json<PromoCode>> {
    Ok(Json(state.run(move |engine| engine.promos().get(id)).await?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PromoCodeId>,
    ApiJson(update): ApiJson<PromoUpdate>,
) -> ApiResult<Json<PromoCode>> {
    Ok(Json(
        state
            .run(move |engine| engine.promos().update(id, update))
            .await?,
    ))
}

pub(super) async fn deactivate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PromoCodeId>,
) -> ApiResult<Json<PromoCode>> {
    Ok(Json(
        state
            .run(move |engine| engine.promos().deactivate(id))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidateBody {
    code: String,
    user: UserId,
    #[serde(default)]
    plan: Option<PlanId>,
    amount: Money,
}

pub(super) async fn validate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidateBody>,
) -> ApiResult<Json<PromoQuote>> {
    let now = Utc::now();
    let quote = state
        .run(move |engine| {
            engine
                .promos()
                .quote(&body.code, body.user, body.plan, body.amount, now)
        })
        .await?;
    Ok(Json(quote))
}

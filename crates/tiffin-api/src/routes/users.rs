use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use tiffin_core::{Page, UserAccount, UserId};
use tiffin_engine::users::{NewUser, ReferralSummary};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

pub(super) async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<UserAccount>)> {
    let user = state.run(|engine| engine.users().register(input)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(paging): ApiQuery<Paging>,
) -> ApiResult<Json<Page<UserAccount>>> {
    let page = paging.request();
    Ok(Json(state.run(move |engine| engine.users().list(page)).await?))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<UserAccount>> {
    Ok(Json(state.run(move |engine| engine.users().get(id)).await?))
}

pub(super) async fn referrals(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<ReferralSummary>> {
    Ok(Json(
        state
            .run(move |engine| engine.users().referral_summary(id))
            .await?,
    ))
}

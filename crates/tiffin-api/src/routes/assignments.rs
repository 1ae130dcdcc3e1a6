//! Vendor assignment queue endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use tiffin_core::{
    AssignmentRequestKind, AssignmentStatus, Page, Priority, RequestId, SubscriptionId, UserId,
    VendorAssignmentRequest, VendorCategory, VendorId, ZoneId,
};
use tiffin_engine::assignment::{
    AutoAssignReport, Candidate, QueueFilter, QueueStats, QueuedRequest, SwitchInput,
};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

const DEFAULT_CANDIDATES: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub(super) struct QueueQuery {
    status: Option<AssignmentStatus>,
    kind: Option<AssignmentRequestKind>,
    zone: Option<ZoneId>,
    priority: Option<Priority>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn queue(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<QueueQuery>,
) -> ApiResult<Json<Page<QueuedRequest>>> {
    let filter = QueueFilter {
        status: q.status,
        kind: q.kind,
        zone: q.zone,
        priority: q.priority,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.assignments().queue(&filter, page))
            .await?,
    ))
}

pub(super) async fn stats(State(state): State<AppState>) -> ApiResult<Json<QueueStats>> {
    Ok(Json(state.run(|engine| engine.assignments().stats()).await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct InitialBody {
    subscription: SubscriptionId,
}

pub(super) async fn request_initial(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<InitialBody>,
) -> ApiResult<(StatusCode, Json<VendorAssignmentRequest>)> {
    let request = state
        .run(move |engine| {
            engine
                .assignments()
                .request_initial_assignment(body.subscription)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub(super) async fn request_switch(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SwitchInput>,
) -> ApiResult<(StatusCode, Json<VendorAssignmentRequest>)> {
    let request = state
        .run(|engine| engine.assignments().request_switch(input))
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
pub(super) struct AutoAssignBody {
    #[serde(default)]
    limit: Option<usize>,
    processed_by: String,
}

pub(super) async fn auto_assign(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AutoAssignBody>,
) -> ApiResult<Json<AutoAssignReport>> {
    let report = state
        .run(move |engine| {
            engine
                .assignments()
                .auto_assign(body.limit, &body.processed_by)
        })
        .await?;
    Ok(Json(report))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RequestId>,
) -> ApiResult<Json<VendorAssignmentRequest>> {
    Ok(Json(state.run(move |engine| engine.assignments().get(id)).await?))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct CandidateQuery {
    category: Option<VendorCategory>,
    limit: Option<usize>,
}

pub(super) async fn candidates(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RequestId>,
    ApiQuery(q): ApiQuery<CandidateQuery>,
) -> ApiResult<Json<Vec<Candidate>>> {
    let limit = q.limit.unwrap_or(DEFAULT_CANDIDATES);
    Ok(Json(
        state
            .run(move |engine| engine.assignments().candidates(id, q.category, limit))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct ApproveBody {
    #[serde(default)]
    vendor: Option<VendorId>,
    processed_by: String,
    #[serde(default)]
    notes: Option<String>,
}

pub(super) async fn approve(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RequestId>,
    ApiJson(body): ApiJson<ApproveBody>,
) -> ApiResult<Json<VendorAssignmentRequest>> {
    let request = state
        .run(move |engine| {
            engine
                .assignments()
                .approve(id, body.vendor, &body.processed_by, body.notes)
        })
        .await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub(super) struct RejectBody {
    processed_by: String,
    reason: String,
}

pub(super) async fn reject(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RequestId>,
    ApiJson(body): ApiJson<RejectBody>,
) -> ApiResult<Json<VendorAssignmentRequest>> {
    let request = state
        .run(move |engine| {
            engine
                .assignments()
                .reject(id, &body.processed_by, &body.reason)
        })
        .await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub(super) struct CancelBody {
    user: UserId,
}

pub(super) async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RequestId>,
    ApiJson(body): ApiJson<CancelBody>,
) -> ApiResult<Json<VendorAssignmentRequest>> {
    Ok(Json(
        state
            .run(move |engine| engine.assignments().cancel(id, body.user))
            .await?,
    ))
}

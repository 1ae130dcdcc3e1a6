use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use tiffin_core::{Order, OrderId, OrderStatus, Page, SubscriptionId, UserId, VendorId};
use tiffin_engine::orders::{NewOrder, OrderFilter};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct OrderQuery {
    user: Option<UserId>,
    subscription: Option<SubscriptionId>,
    vendor: Option<VendorId>,
    status: Option<OrderStatus>,
    delivery_date: Option<NaiveDate>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<OrderQuery>,
) -> ApiResult<Json<Page<Order>>> {
    let filter = OrderFilter {
        user: q.user,
        subscription: q.subscription,
        vendor: q.vendor,
        status: q.status,
        delivery_date: q.delivery_date,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.orders().list(&filter, page))
            .await?,
    ))
}

pub(super) async fn place(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.run(|engine| engine.orders().place(input)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.run(move |engine| engine.orders().get(id)).await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusBody {
    status: OrderStatus,
}

pub(super) async fn advance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<Order>> {
    Ok(Json(
        state
            .run(move |engine| engine.orders().advance(id, body.status))
            .await?,
    ))
}

pub(super) async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.run(move |engine| engine.orders().cancel(id)).await?))
}

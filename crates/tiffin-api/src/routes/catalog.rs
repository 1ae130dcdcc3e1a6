//! Zones, vendors, plans and menus.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Weekday;
use serde::Deserialize;

use tiffin_core::{
    FoodType, LocationZone, MealType, Menu, MenuId, Page, PlanId, SubscriptionPlan,
    VendorCategory, VendorId, VendorProfile, ZoneId,
};
use tiffin_engine::menus::{MenuFilter, MenuUpdate, NewMenu};
use tiffin_engine::plans::{NewPlan, PlanUpdate};
use tiffin_engine::vendors::{NewVendor, VendorFilter, VendorUpdate};
use tiffin_engine::zones::{NewZone, Serviceability, ZoneUpdate};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Paging};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct ZoneQuery {
    #[serde(default)]
    active_only: bool,
    city: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list_zones(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ZoneQuery>,
) -> ApiResult<Json<Page<LocationZone>>> {
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| {
                engine
                    .zones()
                    .list(q.active_only, q.city.as_deref(), page)
            })
            .await?,
    ))
}

pub(super) async fn create_zone(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewZone>,
) -> ApiResult<(StatusCode, Json<LocationZone>)> {
    let created = state.run(|engine| engine.zones().create(input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ZoneId>,
) -> ApiResult<Json<LocationZone>> {
    Ok(Json(state.run(move |engine| engine.zones().get(id)).await?))
}

pub(super) async fn update_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ZoneId>,
    ApiJson(update): ApiJson<ZoneUpdate>,
) -> ApiResult<Json<LocationZone>> {
    Ok(Json(state.run(move |engine| engine.zones().update(id, update)).await?))
}

pub(super) async fn delete_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ZoneId>,
) -> ApiResult<Json<LocationZone>> {
    Ok(Json(state.run(move |engine| engine.zones().deactivate(id)).await?))
}

pub(super) async fn serviceability(
    State(state): State<AppState>,
    ApiPath(pincode): ApiPath<String>,
) -> ApiResult<Json<Serviceability>> {
    Ok(Json(
        state
            .run(move |engine| engine.zones().serviceability(&pincode))
            .await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct VendorQuery {
    zone: Option<ZoneId>,
    category: Option<VendorCategory>,
    food_type: Option<FoodType>,
    verified: Option<bool>,
    #[serde(default)]
    available_only: bool,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list_vendors(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<VendorQuery>,
) -> ApiResult<Json<Page<VendorProfile>>> {
    let filter = VendorFilter {
        zone: q.zone,
        category: q.category,
        food_type: q.food_type,
        verified: q.verified,
        available_only: q.available_only,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.vendors().list(&filter, page))
            .await?,
    ))
}

pub(super) async fn register_vendor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewVendor>,
) -> ApiResult<(StatusCode, Json<VendorProfile>)> {
    let created = state.run(|engine| engine.vendors().register(input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorId>,
) -> ApiResult<Json<VendorProfile>> {
    Ok(Json(state.run(move |engine| engine.vendors().get(id)).await?))
}

pub(super) async fn update_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorId>,
    ApiJson(update): ApiJson<VendorUpdate>,
) -> ApiResult<Json<VendorProfile>> {
    Ok(Json(state.run(move |engine| engine.vendors().update(id, update)).await?))
}

pub(super) async fn delete_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorId>,
) -> ApiResult<Json<VendorProfile>> {
    Ok(Json(state.run(move |engine| engine.vendors().deactivate(id)).await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct VerifyBody {
    #[serde(default = "verified_default")]
    verified: bool,
}

fn verified_default() -> bool {
    true
}

pub(super) async fn verify_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorId>,
    ApiJson(body): ApiJson<VerifyBody>,
) -> ApiResult<Json<VendorProfile>> {
    Ok(Json(state.run(move |engine| engine.vendors().verify(id, body.verified)).await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct AvailabilityBody {
    is_accepting: bool,
}

pub(super) async fn vendor_availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorId>,
    ApiJson(body): ApiJson<AvailabilityBody>,
) -> ApiResult<Json<VendorProfile>> {
    Ok(Json(
        state
            .run(move |engine| engine.vendors().set_availability(id, body.is_accepting))
            .await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PlanQuery {
    #[serde(default)]
    active_only: bool,
    food_type: Option<FoodType>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list_plans(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<PlanQuery>,
) -> ApiResult<Json<Page<SubscriptionPlan>>> {
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.plans().list(q.active_only, q.food_type, page))
            .await?,
    ))
}

pub(super) async fn create_plan(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPlan>,
) -> ApiResult<(StatusCode, Json<SubscriptionPlan>)> {
    let created = state.run(|engine| engine.plans().create(input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PlanId>,
) -> ApiResult<Json<SubscriptionPlan>> {
    Ok(Json(state.run(move |engine| engine.plans().get(id)).await?))
}

pub(super) async fn update_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PlanId>,
    ApiJson(update): ApiJson<PlanUpdate>,
) -> ApiResult<Json<SubscriptionPlan>> {
    Ok(Json(state.run(move |engine| engine.plans().update(id, update)).await?))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MenuQuery {
    vendor: Option<VendorId>,
    day: Option<Weekday>,
    meal_type: Option<MealType>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(super) async fn list_menus(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Page<Menu>>> {
    let filter = MenuFilter {
        vendor: q.vendor,
        day: q.day,
        meal_type: q.meal_type,
    };
    let paging = Paging {
        page: q.page,
        limit: q.limit,
    };
    let page = paging.request();
    Ok(Json(
        state
            .run(move |engine| engine.menus().list(&filter, page))
            .await?,
    ))
}

pub(super) async fn create_menu(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewMenu>,
) -> ApiResult<(StatusCode, Json<Menu>)> {
    let created = state.run(|engine| engine.menus().create(input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuId>,
) -> ApiResult<Json<Menu>> {
    Ok(Json(state.run(move |engine| engine.menus().get(id)).await?))
}

pub(super) async fn update_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuId>,
    ApiJson(update): ApiJson<MenuUpdate>,
) -> ApiResult<Json<Menu>> {
    Ok(Json(state.run(move |engine| engine.menus().update(id, update)).await?))
}

pub(super) async fn delete_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuId>,
) -> ApiResult<StatusCode> {
    state.run(move |engine| engine.menus().delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

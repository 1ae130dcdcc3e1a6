use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

pub(super) async fn health(State(state): State<AppState>) -> Json<Value> {
    let service = &state.service;
    Json(json!({
        "service": service.name(),
        "status": service.state().to_string(),
        "uptime_secs": service.uptime().as_secs(),
    }))
}

pub(super) async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let current = state.service.state();
    let status = if current.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({ "ready": current.is_ready(), "status": current.to_string() })),
    )
}

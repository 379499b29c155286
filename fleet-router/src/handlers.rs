//! Non-proxy HTTP handlers: `/health`, `/stats`, `/services` (spec §4.2
//! public HTTP contract).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::RouterState;

pub async fn health(State(state): State<Arc<RouterState>>) -> Response {
    let healthy = state.pool.healthy_count();
    let body = json!({
        "status": if healthy > 0 { "healthy" } else { "unhealthy" },
        "healthy_services": healthy,
        "registry_url": state.registry_url,
        "timestamp": fleet_common::now_iso(),
    });
    if healthy > 0 {
        Json(body).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

pub async fn stats(State(state): State<Arc<RouterState>>) -> Json<serde_json::Value> {
    let services: Vec<_> = state.pool.all().iter().map(|m| m.to_json()).collect();
    Json(json!({
        "total_services": state.pool.len(),
        "healthy_services": state.pool.healthy_count(),
        "services": services,
        "timestamp": fleet_common::now_iso(),
    }))
}

pub async fn list_services(State(state): State<Arc<RouterState>>) -> Json<serde_json::Value> {
    let services: Vec<_> = state.pool.all().iter().map(|m| m.to_json()).collect();
    Json(json!({
        "services": services,
        "total": services.len(),
    }))
}

//! HTTP handlers implementing the Registry's public contract (spec §4.1).

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_common::ErrorEnvelope;
use serde_json::{json, Value};

use crate::store::{probe_url, HeartbeatRequest, RegisterRequest, UpdateRequest};
use crate::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store = &state.store;
    Json(json!({
        "status": "healthy",
        "registered_services": store.len(),
        "healthy_services": store.healthy_count(),
        "timestamp": fleet_common::now_iso(),
    }))
}

#[derive(Debug, serde::Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
    pub healthy: Option<String>,
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ListFilter>,
) -> Json<Value> {
    let mut services: Vec<Value> = state.store.list().iter().map(|r| r.to_json()).collect();

    if let Some(status) = &filter.status {
        services.retain(|s| s["status"].as_str() == Some(status.as_str()));
    }
    if let Some(healthy) = &filter.healthy {
        let want = healthy.eq_ignore_ascii_case("true");
        services.retain(|s| s["is_healthy"].as_bool() == Some(want));
    }

    Json(json!({
        "services": services,
        "total": services.len(),
        "timestamp": fleet_common::now_iso(),
    }))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.store.get(&name) {
        Some(record) => Json(record.to_json()).into_response(),
        None => not_found(&name),
    }
}

pub async fn register_service(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Response {
    let req: RegisterRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => return bad_request(&invalid_request_message(&e)),
    };
    let name = req.name.clone();
    let record = state.store.register(req);
    tracing::info!(service = %name, url = %record.url, "registered service");
    (
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Service '{name}' registered successfully"),
            "service": record.to_json(),
        })),
    )
        .into_response()
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: axum::body::Bytes,
) -> Response {
    let req: UpdateRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => return bad_request(&invalid_request_message(&e)),
    };
    match state.store.update(&name, req) {
        Some(record) => {
            tracing::info!(service = %name, "updated service");
            Json(json!({
                "message": format!("Service '{name}' updated successfully"),
                "service": record.to_json(),
            }))
            .into_response()
        }
        None => not_found(&name),
    }
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.store.remove(&name) {
        Some(_) => {
            tracing::info!(service = %name, "unregistered service");
            Json(json!({ "message": format!("Service '{name}' unregistered successfully") }))
                .into_response()
        }
        None => not_found(&name),
    }
}

pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: axum::body::Bytes,
) -> Response {
    let req: HeartbeatRequest = if body.is_empty() {
        HeartbeatRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_default()
    };
    match state.store.heartbeat(&name, req) {
        Some(()) => Json(json!({
            "message": "Heartbeat received",
            "timestamp": fleet_common::now_iso(),
        }))
        .into_response(),
        None => not_found(&name),
    }
}

/// `GET /services/{name}/health` — an on-demand probe, not a cached
/// read: it triggers a fresh health check and returns the result
/// immediately, matching the original `service_health_handler`.
pub async fn service_health(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let Some(record) = state.store.get(&name) else {
        return not_found(&name);
    };
    let url = probe_url(&record);
    let healthy = probe_once(&state.http, &url, state.health_timeout).await;
    state.store.set_health(&name, healthy);
    let record = state.store.get(&name).expect("just set");

    Json(json!({
        "health_status": match record.health_status {
            fleet_common::HealthStatus::Healthy => "healthy",
            fleet_common::HealthStatus::Unhealthy => "unhealthy",
            fleet_common::HealthStatus::Unknown => "unknown",
        },
        "is_healthy": record.is_healthy(),
        "last_heartbeat": record.last_heartbeat,
        "timestamp": fleet_common::now_iso(),
    }))
    .into_response()
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let s = state.store.stats();
    Json(json!({
        "total_services": s.total,
        "healthy_services": s.healthy,
        "unhealthy_services": s.total - s.healthy,
        "status_distribution": s.status_distribution,
        "host_distribution": s.host_distribution,
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": fleet_common::now_iso(),
    }))
}

/// Shared by the on-demand probe handler and the periodic poller.
pub async fn probe_once(http: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, http.get(url).send()).await,
        Ok(Ok(resp)) if resp.status().is_success()
    )
}

fn not_found(name: &str) -> Response {
    ErrorEnvelope::response(
        StatusCode::NOT_FOUND,
        format!("Service '{name}' not found"),
    )
}

fn bad_request(message: &str) -> Response {
    ErrorEnvelope::response(StatusCode::BAD_REQUEST, message)
}

fn invalid_request_message(e: &serde_json::Error) -> String {
    if e.is_data() {
        format!("Missing or invalid field: {e}")
    } else {
        "Invalid JSON".to_string()
    }
}

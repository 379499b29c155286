//! The Supervisor's own management HTTP surface (spec §4.3 step 6,
//! grounded in `enhanced_babysitter.py::setup_web_server`): exactly
//! `/health`, `/models`, `/info` — no proxy fallback route, unlike the
//! Router.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_common::ErrorEnvelope;
use serde::Serialize;
use serde_json::json;

use crate::SupervisorState;

/// The subset of the Supervisor's CLI configuration worth echoing back
/// on `/info`, with intervals rendered as plain seconds rather than a
/// `Duration`'s internal representation.
#[derive(Serialize)]
struct ConfigSnapshot {
    #[serde(with = "fleet_common::duration_secs")]
    heartbeat_interval: Duration,
    #[serde(with = "fleet_common::duration_secs")]
    restart_delay: Duration,
    max_restarts: u32,
}

pub async fn health(State(state): State<Arc<SupervisorState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": state.config.name,
        "babysitter": "enhanced",
        "infinilm_server_running": state.worker_ready.load(Ordering::Relaxed),
        "infinilm_server_port": state.config.port,
        "timestamp": fleet_common::now_iso(),
    }))
}

/// Proxies `GET /models` to the worker once it's ready; 503 before that,
/// matching the original's "not ready" / "unavailable" distinction.
pub async fn models(State(state): State<Arc<SupervisorState>>) -> Response {
    if !state.worker_ready.load(Ordering::Relaxed) {
        return ErrorEnvelope::response(StatusCode::SERVICE_UNAVAILABLE, "Worker is not ready");
    }

    let url = format!("http://{}:{}/models", state.config.host, state.config.port);
    match state.http.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| json!({"data": []}));
            Json(body).into_response()
        }
        _ => ErrorEnvelope::response(StatusCode::SERVICE_UNAVAILABLE, "Worker is unavailable"),
    }
}

pub async fn info(State(state): State<Arc<SupervisorState>>) -> Json<serde_json::Value> {
    let models = state.models.lock().await.clone();
    let config = ConfigSnapshot {
        heartbeat_interval: Duration::from_secs(state.config.heartbeat_interval),
        restart_delay: Duration::from_secs(state.config.restart_delay),
        max_restarts: state.config.max_restarts,
    };
    Json(json!({
        "name": state.config.name,
        "host": state.config.host,
        "port": state.config.management_port(),
        "url": format!("http://{}:{}", state.config.host, state.config.management_port()),
        "worker_port": state.config.port,
        "models": models,
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "config": serde_json::to_value(&config).unwrap_or_default(),
    }))
}

//! Authoritative, in-memory service directory for the inference fleet
//! (spec §4.1). Tracks every running worker and router instance, polls
//! each one's health on a fixed interval, and evicts entries that go
//! quiet for too long.

pub mod cleanup;
pub mod config;
pub mod handlers;
pub mod health;
pub mod store;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::RegistryConfig;
use crate::store::ServiceStore;

/// Shared state handed to every HTTP handler and background task.
pub struct AppState {
    pub store: ServiceStore,
    pub http: reqwest::Client,
    pub health_timeout: Duration,
    pub started_at: Instant,
}

/// Builds the Registry's router and shared state. Returns the state
/// alongside the router so callers can also hand it to the background
/// polling tasks without re-deriving it.
pub fn create_server(config: &RegistryConfig) -> (Router, Arc<AppState>) {
    let health_timeout = Duration::from_secs(config.health_timeout);
    let state = Arc::new(AppState {
        store: ServiceStore::new(),
        http: fleet_common::http::client(health_timeout),
        health_timeout,
        started_at: Instant::now(),
    });

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/services",
            get(handlers::list_services).post(handlers::register_service),
        )
        .route(
            "/services/{name}",
            get(handlers::get_service)
                .put(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .route("/services/{name}/heartbeat", post(handlers::heartbeat))
        .route("/services/{name}/health", get(handlers::service_health))
        .route("/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (router, state)
}

/// Spawns the Registry's two background loops (health polling and
/// staleness eviction). Both stop as soon as `running` is flipped to
/// `false`, so callers can join them during graceful shutdown.
pub fn spawn_background_tasks(
    state: Arc<AppState>,
    config: &RegistryConfig,
    running: Arc<AtomicBool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let health_state = state.clone();
    let health_interval = Duration::from_secs(config.health_interval);
    let health_running = running.clone();
    let health_task = tokio::spawn(async move {
        health::poll_loop(health_state, health_interval, health_running).await;
    });

    let cleanup_interval = Duration::from_secs(config.cleanup_interval);
    let cleanup_task = tokio::spawn(async move {
        cleanup::sweep_loop(state, cleanup_interval, running).await;
    });

    vec![health_task, cleanup_task]
}

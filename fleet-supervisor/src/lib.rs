//! Spawns and supervises one inference worker process, registering it
//! (and itself) in the fleet registry and restarting it across crashes
//! (spec §4.3).

pub mod config;
pub mod handlers;
pub mod heartbeat;
pub mod readiness;
pub mod registration;
pub mod spawn;
pub mod supervise;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use axum::Router;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::config::SupervisorConfig;

/// Shared state handed to the management HTTP server and both
/// background loops.
pub struct SupervisorState {
    pub config: SupervisorConfig,
    pub http: reqwest::Client,
    pub worker_ready: AtomicBool,
    pub models: Mutex<Vec<String>>,
    pub started_at: Instant,
}

pub fn create_server(config: &SupervisorConfig) -> (Router, Arc<SupervisorState>) {
    let state = Arc::new(SupervisorState {
        config: config.clone(),
        http: fleet_common::http::client(Duration::from_secs(10)),
        worker_ready: AtomicBool::new(false),
        models: Mutex::new(Vec::new()),
        started_at: Instant::now(),
    });

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/models", get(handlers::models))
        .route("/info", get(handlers::info))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (router, state)
}

/// Spawns the crash/restart supervision loop and the Registry heartbeat
/// loop. Both stop once `running` is flipped to `false`.
pub fn spawn_background_tasks(
    state: Arc<SupervisorState>,
    running: Arc<AtomicBool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let supervise_state = state.clone();
    let supervise_running = running.clone();
    let supervise_task = tokio::spawn(async move {
        supervise::run_loop(supervise_state, supervise_running).await;
    });

    let heartbeat_interval = Duration::from_secs(state.config.heartbeat_interval);
    let heartbeat_running = running.clone();
    let heartbeat_task = tokio::spawn(async move {
        if state.config.registry.is_some() {
            heartbeat::run_loop(state, heartbeat_interval, heartbeat_running).await;
        }
    });

    vec![supervise_task, heartbeat_task]
}

/// Best-effort registration of the Supervisor itself, run once at
/// startup before the background loops begin.
pub async fn register_self(state: &SupervisorState) {
    if let Some(registry) = &state.config.registry {
        registration::register_self(&state.http, registry, &state.config).await;
    }
}

/// Best-effort cleanup on shutdown: unregisters both the Supervisor and
/// its worker's `-server` record.
pub async fn unregister_self(state: &SupervisorState) {
    if let Some(registry) = &state.config.registry {
        registration::unregister_all(&state.http, registry, &state.config.name).await;
    }
}

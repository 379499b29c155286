//! Weighted-round-robin reverse proxy over a fleet of inference
//! backends (spec §4.2). Maintains its pool from a static config file
//! and/or periodic Registry sync, probes liveness independently, and
//! proxies every non-management request to a weighted choice among
//! healthy backends.

pub mod config;
pub mod handlers;
pub mod health;
pub mod pool;
pub mod proxy;
pub mod selection;
pub mod static_config;
pub mod sync;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::RouterConfig;
use crate::pool::Pool;

/// Shared state handed to every HTTP handler and background task.
pub struct RouterState {
    pub pool: Pool,
    /// Client used for the proxy path — 300s total budget (spec §5).
    pub http: reqwest::Client,
    /// Client used for the independent health poller — short total
    /// budget, kept separate so a hung backend's proxy traffic can
    /// never stall a health probe sharing the same connection pool.
    pub health_http: reqwest::Client,
    pub health_timeout: Duration,
    pub registry_url: String,
}

pub fn create_server(config: &RouterConfig) -> anyhow::Result<(Router, Arc<RouterState>)> {
    let pool = Pool::new();

    if let Some(path) = &config.static_services {
        let count = static_config::load_into_pool(path, &pool)?;
        tracing::info!(count, path, "loaded static services");
    }

    let health_timeout = Duration::from_secs(config.health_timeout);
    let state = Arc::new(RouterState {
        pool,
        http: fleet_common::http::client(Duration::from_secs(300)),
        health_http: fleet_common::http::client(health_timeout),
        health_timeout,
        registry_url: config.registry_url.clone(),
    });

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/services", get(handlers::list_services))
        .fallback(proxy::handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((router, state))
}

/// Spawns the Router's two background loops: registry sync and
/// independent health polling.
pub fn spawn_background_tasks(
    state: Arc<RouterState>,
    config: &RouterConfig,
    running: Arc<AtomicBool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let sync_state = state.clone();
    let sync_interval = Duration::from_secs(config.registry_sync_interval);
    let sync_running = running.clone();
    let sync_client = fleet_common::http::client(Duration::from_secs(10));
    let sync_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sync_interval);
        ticker.tick().await;
        while sync_running.load(std::sync::atomic::Ordering::Relaxed) {
            ticker.tick().await;
            if !sync_running.load(std::sync::atomic::Ordering::Relaxed) {
                break;
            }
            if let Err(e) =
                sync::sync_once(&sync_state.pool, &sync_state.registry_url, &sync_client).await
            {
                tracing::warn!(error = %e, "registry sync failed");
            }
        }
    });

    let health_interval = Duration::from_secs(config.health_interval);
    let health_timeout = state.health_timeout;
    let health_task = tokio::spawn(async move {
        health::poll_loop(state, health_interval, health_timeout, running).await;
    });

    vec![sync_task, health_task]
}

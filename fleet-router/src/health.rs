//! The Router's independent liveness probing (spec §4.2 "Independent
//! liveness", grounded in `distributed_router.py::health_check` /
//! `perform_health_checks`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::RouterState;

pub async fn poll_loop(
    state: Arc<RouterState>,
    interval: Duration,
    timeout: Duration,
    running: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }

        let members = state.pool.all();
        let checks = members.iter().map(|member| {
            let http = state.health_http.clone();
            let url = format!("{}/health", member.url.trim_end_matches('/'));
            async move {
                let started = Instant::now();
                let result = tokio::time::timeout(timeout, http.get(&url).send()).await;
                let healthy = matches!(result, Ok(Ok(resp)) if resp.status().is_success());
                (healthy, started.elapsed())
            }
        });
        let results = futures::future::join_all(checks).await;

        for (member, (healthy, elapsed)) in members.iter().zip(results) {
            member.healthy.store(healthy, Ordering::Relaxed);
            *member.response_time.lock().unwrap() = elapsed;
            *member.last_check.lock().unwrap() = Some(Utc::now());
            if !healthy {
                member.error_count.fetch_add(1, Ordering::Relaxed);
            }
        }

        tracing::info!(
            healthy = state.pool.healthy_count(),
            total = state.pool.len(),
            "router health check completed"
        );
    }
}

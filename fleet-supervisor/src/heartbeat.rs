//! Keeps both the Supervisor's own record and its worker's `-server`
//! record alive in the Registry (spec §4.3 step 5, grounded in
//! `enhanced_babysitter.py::heartbeat_loop`). The worker's record may not
//! exist yet — a 404 is tolerated silently until it does, then logged
//! once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::SupervisorState;

pub async fn run_loop(state: Arc<SupervisorState>, interval: Duration, running: Arc<AtomicBool>) {
    let server_name = format!("{}-server", state.config.name);
    let mut server_registered = false;

    while running.load(Ordering::Relaxed) {
        heartbeat_one(&state, &state.config.name).await;

        if state.worker_ready.load(Ordering::Relaxed) {
            let ok = heartbeat_one(&state, &server_name).await;
            if ok && !server_registered {
                tracing::info!(service = %server_name, "worker is now registered");
                server_registered = true;
            }
        }

        sleep_responsive(interval, &running).await;
    }
}

async fn heartbeat_one(state: &SupervisorState, name: &str) -> bool {
    let url = format!(
        "{}/services/{name}/heartbeat",
        state.config.registry.as_deref().unwrap_or_default().trim_end_matches('/')
    );
    if state.config.registry.is_none() {
        return false;
    }
    match state.http.post(&url).json(&serde_json::json!({})).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => false,
        Ok(response) => {
            tracing::warn!(service = %name, status = %response.status(), "heartbeat rejected");
            false
        }
        Err(error) => {
            tracing::warn!(service = %name, %error, "heartbeat failed to reach registry");
            false
        }
    }
}

/// Sleeps in one-second slices so shutdown is noticed promptly rather
/// than after a full `interval`.
async fn sleep_responsive(interval: Duration, running: &Arc<AtomicBool>) {
    let mut remaining = interval;
    let step = Duration::from_secs(1);
    while remaining > Duration::ZERO && running.load(Ordering::Relaxed) {
        let slice = remaining.min(step);
        tokio::time::sleep(slice).await;
        remaining = remaining.saturating_sub(slice);
    }
}

//! Periodic health polling of every registered service (spec §4.1
//! "Health polling algorithm").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::handlers::probe_once;
use crate::store::probe_url;
use crate::AppState;

pub async fn poll_loop(state: Arc<AppState>, interval: Duration, running: Arc<AtomicBool>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; skip it
    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }

        let records = state.store.list();
        let timeout = state.health_timeout;
        let checks = records.iter().map(|record| {
            let http = state.http.clone();
            let url = probe_url(record);
            let name = record.name.clone();
            async move {
                let healthy = probe_once(&http, &url, timeout).await;
                (name, healthy)
            }
        });
        let results = futures::future::join_all(checks).await;
        for (name, healthy) in &results {
            state.store.set_health(name, *healthy);
        }
        tracing::info!(
            healthy = results.iter().filter(|(_, h)| *h).count(),
            total = results.len(),
            "health check completed"
        );
    }
}

//! Staleness eviction (spec §4.1 "Staleness eviction").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::AppState;

/// A service with no heartbeat or successful poll for this many seconds
/// is removed. Not exposed as a CLI flag — the original hardcodes it too.
pub const STALENESS_TTL_SECS: f64 = 300.0;

pub async fn sweep_loop(state: Arc<AppState>, interval: Duration, running: Arc<AtomicBool>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }

        let removed = state.store.evict_stale(STALENESS_TTL_SECS);
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), services = ?removed, "evicted stale services");
        }
    }
}

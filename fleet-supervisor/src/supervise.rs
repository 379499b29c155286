//! The crash/restart loop (spec §4.3 steps 1, 2, 4, grounded in
//! `enhanced_babysitter.py::monitor_service`/`run`). Any exit — code 0
//! or otherwise — counts as a crash to restart from: a worker that
//! exits cleanly still needs to be supervised, not treated as "done".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;

use crate::{registration, spawn};
use crate::SupervisorState;

const READINESS_BUDGET: Duration = Duration::from_secs(120);

pub async fn run_loop(state: Arc<SupervisorState>, running: Arc<AtomicBool>) {
    let max_restarts = state.config.max_restarts;
    let restart_delay = Duration::from_secs(state.config.restart_delay);
    let mut attempt: u32 = 0;

    while running.load(Ordering::Relaxed) {
        attempt += 1;
        tracing::info!(attempt, "starting worker process");

        let mut child = match spawn::build_command(&state.config).spawn() {
            Ok(child) => child,
            Err(error) => {
                tracing::error!(%error, "failed to spawn worker process");
                break;
            }
        };

        pipe_output(&mut child);

        state.worker_ready.store(false, Ordering::Relaxed);
        let state_for_readiness = state.clone();
        let readiness_task = tokio::spawn(async move {
            announce_readiness(state_for_readiness).await;
        });

        let exit = tokio::select! {
            result = child.wait() => result,
            _ = watch_for_shutdown(&running) => {
                tracing::info!("shutdown requested, stopping worker process");
                force_kill(&mut child).await
            }
        };
        readiness_task.abort();

        match exit {
            Ok(status) => tracing::warn!(code = status.code(), "worker process exited"),
            Err(error) => tracing::error!(%error, "failed to wait on worker process"),
        }
        state.worker_ready.store(false, Ordering::Relaxed);

        if !running.load(Ordering::Relaxed) {
            break;
        }

        if exceeds_restart_budget(attempt, max_restarts) {
            tracing::error!(
                attempts = attempt,
                max_restarts,
                "worker exceeded maximum restart attempts, giving up"
            );
            break;
        }

        tokio::time::sleep(restart_delay).await;
    }
}

/// `attempt` is the spawn just completed (1-indexed); once it exceeds
/// `max_restarts` the loop stops rather than spawning again, so the
/// total number of spawns across a run is always `max_restarts + 1`.
fn exceeds_restart_budget(attempt: u32, max_restarts: u32) -> bool {
    attempt > max_restarts
}

async fn announce_readiness(state: Arc<SupervisorState>) {
    let Some(models) =
        crate::readiness::wait_ready(&state.config.host, state.config.port, READINESS_BUDGET).await
    else {
        return;
    };

    *state.models.lock().await = models.clone();
    state.worker_ready.store(true, Ordering::Relaxed);

    if let Some(registry) = &state.config.registry {
        registration::register_worker(&state.http, registry, &state.config, &models).await;
    }
}

async fn watch_for_shutdown(running: &Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// SIGTERM, then a ten-second grace period, then SIGKILL — grounded in
/// `enhanced_babysitter.py::signal_handler`'s `terminate()` / `wait(timeout=10)`
/// / `kill()` fallback.
async fn force_kill(child: &mut Child) -> std::io::Result<std::process::ExitStatus> {
    if let Err(error) = child.start_kill() {
        tracing::warn!(%error, "failed to send kill signal to worker process");
    }
    match tokio::time::timeout(Duration::from_secs(10), child.wait()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("worker process did not exit within grace period, forcing kill");
            let _ = child.start_kill();
            child.wait().await
        }
    }
}

fn pipe_output(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!(target: "worker", "{line}");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::warn!(target: "worker", "{line}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_budget_allows_exactly_max_restarts_plus_one_spawns() {
        // max_restarts = 2: attempts 1 and 2 are within budget (spawn
        // again), attempt 3 exceeds it (stop) — three total spawns.
        let max_restarts = 2;
        let mut spawns = 0;
        for attempt in 1..=10u32 {
            spawns = attempt;
            if exceeds_restart_budget(attempt, max_restarts) {
                break;
            }
        }
        assert_eq!(spawns, 3);
    }

    #[test]
    fn zero_max_restarts_still_spawns_once_then_stops() {
        assert!(exceeds_restart_budget(1, 0));
    }
}

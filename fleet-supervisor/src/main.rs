//! Binary entry point for the Supervisor.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use fleet_supervisor::config::SupervisorConfig;

async fn shutdown_signal(running: Arc<AtomicBool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
    running.store(false, Ordering::Relaxed);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SupervisorConfig::parse();
    let _log_guard = fleet_common::logging::init("fleet-supervisor", &config.log_level)?;

    let (app, state) = fleet_supervisor::create_server(&config);
    fleet_supervisor::register_self(&state).await;

    let running = Arc::new(AtomicBool::new(true));
    let tasks = fleet_supervisor::spawn_background_tasks(state.clone(), running.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.management_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, worker = %config.name, "fleet-supervisor listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(running))
        .await?;

    fleet_supervisor::unregister_self(&state).await;

    for task in tasks {
        task.abort();
    }

    Ok(())
}

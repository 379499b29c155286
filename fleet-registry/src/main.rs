//! Binary entry point for the service Registry.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use fleet_registry::config::RegistryConfig;

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
    let config = RegistryConfig::parse();
    let _log_guard = fleet_common::logging::init("fleet-registry", &config.log_level)?;

    let (app, state) = fleet_registry::create_server(&config);
    let running = Arc::new(AtomicBool::new(true));

    let tasks = fleet_registry::spawn_background_tasks(state, &config, running.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "fleet-registry listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(running))
        .await?;

    for task in tasks {
        task.abort();
    }

    Ok(())
}

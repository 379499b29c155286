//! Structured logging setup shared by all three binaries.
//!
//! Each component writes to stdout *and* to `logs/{component}.log`
//! (spec §6 Environment: "Each component creates a `logs/` directory at
//! startup ... and writes its log file there"). Grounded in
//! `ultrafast-gateway/src/main.rs`'s
//! `tracing_subscriber::fmt().with_env_filter(...).init()` call,
//! extended with a file layer since every one of the three original
//! Python processes logs to both a `FileHandler` and a `StreamHandler`.

use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global tracing subscriber. Returns a guard that must be
/// held for the lifetime of `main` — dropping it flushes the file
/// appender's background writer thread.
pub fn init(component: &str, log_level: &str) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all("logs")?;
    let file_appender = tracing_appender::rolling::never("logs", format!("{component}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}

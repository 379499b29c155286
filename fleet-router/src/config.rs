//! Command-line surface for the Router (spec §6).

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "InfiniLM-fleet weighted reverse proxy")]
pub struct RouterConfig {
    /// Port the Router's HTTP server listens on.
    #[arg(long = "router-port", default_value_t = 8080)]
    pub router_port: u16,

    /// Base URL of the Registry to sync the pool from.
    #[arg(long, default_value = "http://127.0.0.1:8081")]
    pub registry_url: String,

    /// Path to a JSON file of statically configured backends, exempt
    /// from registry-sync eviction.
    #[arg(long = "static-services")]
    pub static_services: Option<String>,

    /// Interval, in seconds, between independent backend health probes.
    #[arg(long = "health-interval", default_value_t = 30)]
    pub health_interval: u64,

    /// Total timeout, in seconds, for a single backend health probe.
    #[arg(long = "health-timeout", default_value_t = 5)]
    pub health_timeout: u64,

    /// Number of consecutive proxy errors tolerated for a backend before
    /// it is considered for removal on the next sync. Accepted for
    /// compatibility with the static-services file's `max_fails` field;
    /// the Router does not currently act on it beyond bookkeeping.
    #[arg(long = "max-errors", default_value_t = 3)]
    pub max_errors: u32,

    /// Interval, in seconds, between registry-sync sweeps.
    #[arg(long = "registry-sync-interval", default_value_t = 60)]
    pub registry_sync_interval: u64,

    /// Log level passed to the tracing env filter.
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

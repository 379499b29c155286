//! Command-line surface for the Registry (spec §6).

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "InfiniLM-fleet service registry")]
pub struct RegistryConfig {
    /// Port the registry's HTTP server listens on.
    #[arg(long, default_value_t = 8081)]
    pub port: u16,

    /// Interval, in seconds, between health-probe sweeps of every
    /// registered service.
    #[arg(long = "health-interval", default_value_t = 30)]
    pub health_interval: u64,

    /// Total timeout, in seconds, for a single health probe.
    #[arg(long = "health-timeout", default_value_t = 5)]
    pub health_timeout: u64,

    /// Interval, in seconds, between staleness-eviction sweeps.
    #[arg(long = "cleanup-interval", default_value_t = 60)]
    pub cleanup_interval: u64,

    /// Log level passed to the tracing env filter.
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

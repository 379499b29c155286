//! Command-line surface for the Supervisor (spec §6), including the
//! worker passthrough flags forwarded onto the spawned child's argv
//! (grounded in `enhanced_babysitter.py`'s `--dev`/`--ndev`/`--max-batch`/
//! `--max-tokens`/`--awq`/`--request-timeout`, renamed generically).

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "InfiniLM-fleet worker supervisor")]
pub struct SupervisorConfig {
    /// Host the Supervisor's management server and worker both bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Worker port. The Supervisor's own management server binds
    /// `port + 1` (spec §4.3 port convention).
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Service name registered in the Registry.
    #[arg(long)]
    pub name: String,

    /// Registry base URL. Registration and heartbeats are skipped if
    /// absent.
    #[arg(long)]
    pub registry: Option<String>,

    /// Router base URL, checked at startup for connectivity only.
    #[arg(long)]
    pub router: Option<String>,

    /// Maximum number of restart attempts after the initial spawn.
    #[arg(long = "max-restarts", default_value_t = 10)]
    pub max_restarts: u32,

    /// Delay, in seconds, before respawning a crashed child.
    #[arg(long = "restart-delay", default_value_t = 5)]
    pub restart_delay: u64,

    /// Interval, in seconds, between heartbeats sent to the Registry.
    #[arg(long = "heartbeat-interval", default_value_t = 30)]
    pub heartbeat_interval: u64,

    /// Which worker command line to build.
    #[arg(long = "service-type", value_enum, default_value_t = WorkerKind::Worker)]
    pub service_type: WorkerKind,

    /// Model path (worker) or config file path (worker-native).
    #[arg(long)]
    pub path: String,

    /// Device type passed to the worker.
    #[arg(long, default_value = "nvidia")]
    pub device: String,

    /// Number of devices passed to the worker.
    #[arg(long = "device-count", default_value_t = 1)]
    pub device_count: u32,

    /// Max batch size passed to the worker.
    #[arg(long = "batch-size", default_value_t = 3)]
    pub batch_size: u32,

    /// Max tokens passed to the worker, if set.
    #[arg(long = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Request a quantized (AWQ) model variant from the worker.
    #[arg(long)]
    pub quantize: bool,

    /// Per-request timeout, in seconds, passed to the worker.
    #[arg(long = "request-timeout", default_value_t = 300)]
    pub request_timeout: u64,

    /// Log level passed to the tracing env filter.
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl SupervisorConfig {
    pub fn management_port(&self) -> u16 {
        self.port + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkerKind {
    Worker,
    WorkerNative,
}

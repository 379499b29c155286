//! Builds the worker child process command line (spec §4.3 step 1,
//! grounded in `enhanced_babysitter.py`'s `_start_rust_service` /
//! `_start_infinilm_service`). A closed `match` over [`WorkerKind`]
//! rather than a trait object: there are exactly two kinds, and the
//! Supervisor never needs to add a third without recompiling anyway
//! (spec §9 REDESIGN FLAG).

use std::process::Stdio;

use tokio::process::Command;

use crate::config::{SupervisorConfig, WorkerKind};

pub fn build_command(config: &SupervisorConfig) -> Command {
    let mut command = match config.service_type {
        WorkerKind::Worker => worker_command(config),
        WorkerKind::WorkerNative => worker_native_command(config),
    };
    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

fn worker_command(config: &SupervisorConfig) -> Command {
    let mut command = Command::new("infinilm-worker");
    command
        .arg("--model")
        .arg(&config.path)
        .arg("--host")
        .arg(&config.host)
        .arg("--port")
        .arg(config.port.to_string())
        .arg("--device")
        .arg(&config.device)
        .arg("--device-count")
        .arg(config.device_count.to_string())
        .arg("--batch-size")
        .arg(config.batch_size.to_string())
        .arg("--request-timeout")
        .arg(config.request_timeout.to_string());

    if let Some(max_tokens) = config.max_tokens {
        command.arg("--max-tokens").arg(max_tokens.to_string());
    }
    if config.quantize {
        command.arg("--awq");
    }

    command
}

fn worker_native_command(config: &SupervisorConfig) -> Command {
    let mut command = Command::new("infinilm-worker-native");
    command
        .arg("--config")
        .arg(&config.path)
        .arg("--host")
        .arg(&config.host)
        .arg("--port")
        .arg(config.port.to_string())
        .arg("--device")
        .arg(&config.device)
        .arg("--device-count")
        .arg(config.device_count.to_string());

    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(service_type: &str) -> SupervisorConfig {
        SupervisorConfig::parse_from([
            "fleet-supervisor",
            "--name",
            "worker-0",
            "--path",
            "/models/llama",
            "--service-type",
            service_type,
        ])
    }

    #[test]
    fn worker_kind_invokes_the_worker_binary() {
        let cfg = config("worker");
        let command = build_command(&cfg);
        assert_eq!(command.as_std().get_program(), "infinilm-worker");
    }

    #[test]
    fn worker_native_kind_invokes_the_native_binary() {
        let cfg = config("worker-native");
        let command = build_command(&cfg);
        assert_eq!(command.as_std().get_program(), "infinilm-worker-native");
    }
}

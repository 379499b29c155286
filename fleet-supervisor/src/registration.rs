//! Registers the Supervisor itself and its supervised worker with the
//! Registry (spec §4.3 step 3, grounded in
//! `enhanced_babysitter.py::register_with_registry` /
//! `register_service_with_registry`). Both calls are best-effort: a
//! Registry that's unreachable is logged and otherwise ignored, since
//! the Supervisor's own job — keeping the worker alive — doesn't depend
//! on it.

use serde_json::{json, Value};

use crate::config::SupervisorConfig;

/// Registers the Supervisor process itself, tagged `metadata.type =
/// "babysitter"` so the Registry's health poller and the Router both
/// know to treat it as a management endpoint rather than an inference
/// backend.
pub async fn register_self(http: &reqwest::Client, registry_url: &str, config: &SupervisorConfig) {
    let body = json!({
        "name": config.name,
        "host": config.host,
        "port": config.management_port(),
        "hostname": config.host,
        "url": format!("http://{}:{}", config.host, config.management_port()),
        "status": "running",
        "metadata": {
            "type": "babysitter",
            "service_type": service_type_tag(config),
            "path": config.path,
            "started_at": fleet_common::now_iso(),
        },
    });
    post_register(http, registry_url, &config.name, &body).await;
}

/// Registers the worker process under `{name}-server` once it reports
/// ready, tagged `metadata.type = "openai-api"` so the Router's
/// management-port health-probe convention (spec §4.1) skips straight to
/// the worker's own port.
pub async fn register_worker(
    http: &reqwest::Client,
    registry_url: &str,
    config: &SupervisorConfig,
    models: &[String],
) {
    let server_name = format!("{}-server", config.name);
    let mut metadata = json!({
        "type": "openai-api",
        "parent_service": config.name,
        "babysitter": "enhanced",
        "started_at": fleet_common::now_iso(),
    });
    if !models.is_empty() {
        metadata["models"] = Value::from(models.len());
        metadata["models_list"] = Value::from(models.to_vec());
    }

    let body = json!({
        "name": server_name,
        "host": config.host,
        "port": config.port,
        "hostname": config.host,
        "url": format!("http://{}:{}", config.host, config.port),
        "status": "running",
        "metadata": metadata,
    });
    post_register(http, registry_url, &server_name, &body).await;
}

/// Unregisters both the Supervisor's own name and `{name}-server`
/// (grounded in `unregister_from_registry`, which tries both
/// unconditionally and tolerates either being already absent).
pub async fn unregister_all(http: &reqwest::Client, registry_url: &str, name: &str) {
    delete_service(http, registry_url, name).await;
    delete_service(http, registry_url, &format!("{name}-server")).await;
}

async fn post_register(http: &reqwest::Client, registry_url: &str, name: &str, body: &Value) {
    let url = format!("{}/services", registry_url.trim_end_matches('/'));
    match http.post(&url).json(body).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!(service = %name, "registered with registry");
        }
        Ok(response) => {
            tracing::warn!(service = %name, status = %response.status(), "registry rejected registration");
        }
        Err(error) => {
            tracing::warn!(service = %name, %error, "failed to reach registry for registration");
        }
    }
}

async fn delete_service(http: &reqwest::Client, registry_url: &str, name: &str) {
    let url = format!("{}/services/{name}", registry_url.trim_end_matches('/'));
    match http.delete(&url).send().await {
        Ok(_) => tracing::info!(service = %name, "unregistered from registry"),
        Err(error) => tracing::warn!(service = %name, %error, "failed to unregister from registry"),
    }
}

fn service_type_tag(config: &SupervisorConfig) -> &'static str {
    match config.service_type {
        crate::config::WorkerKind::Worker => "worker",
        crate::config::WorkerKind::WorkerNative => "worker-native",
    }
}

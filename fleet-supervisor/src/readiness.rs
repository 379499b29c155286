//! Polls a freshly-spawned worker for readiness (spec §4.3 step 2,
//! grounded in `enhanced_babysitter.py::detect_infinilm_service_port` /
//! `fetch_models_from_server`). The original deliberately builds a new
//! connection-pool-of-one `requests.Session` per attempt and sets
//! `Connection: close`; here that's a fresh [`reqwest::Client`] per
//! attempt via [`fleet_common::http::client_with_connect_timeout`], so a
//! wedged worker can never pin a half-open connection across retries.

use std::time::{Duration, Instant};

use serde_json::Value;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_DELAY: Duration = Duration::from_secs(1);
const LOG_EVERY: u32 = 10;

/// Polls `GET http://{host}:{port}/models` until it returns a non-empty
/// model list, or `budget` elapses. Transport errors (connection refused,
/// read timeout) and 502/503 responses are treated as "not ready yet"
/// and retried silently; any other status is logged once per ten
/// attempts but still retried.
pub async fn wait_ready(host: &str, port: u16, budget: Duration) -> Option<Vec<String>> {
    let url = format!("http://{host}:{port}/models");
    let started = Instant::now();
    let mut attempt: u32 = 0;

    while started.elapsed() < budget {
        attempt += 1;
        let client = fleet_common::http::client_with_connect_timeout(CONNECT_TIMEOUT, REQUEST_TIMEOUT);

        match client.get(&url).header("Connection", "close").send().await {
            Ok(response) if response.status().is_success() => {
                if let Ok(body) = response.json::<Value>().await {
                    let models = extract_model_ids(&body);
                    if !models.is_empty() {
                        tracing::info!(attempt, %url, "worker reported ready");
                        return Some(models);
                    }
                }
            }
            Ok(response) => {
                let status = response.status();
                let transient = status == reqwest::StatusCode::BAD_GATEWAY
                    || status == reqwest::StatusCode::SERVICE_UNAVAILABLE;
                if !transient && attempt % LOG_EVERY == 0 {
                    tracing::warn!(attempt, %status, %url, "worker not ready yet");
                }
            }
            Err(_) => {
                if attempt % LOG_EVERY == 0 {
                    tracing::info!(attempt, %url, "still waiting for worker to accept connections");
                }
            }
        }

        tokio::time::sleep(POLL_DELAY).await;
    }

    tracing::warn!(%url, elapsed_secs = started.elapsed().as_secs(), "worker readiness budget exhausted");
    None
}

/// Accepts either an OpenAI-style `{"data":[{"id": ...}, ...]}` body or a
/// bare list of IDs.
fn extract_model_ids(body: &Value) -> Vec<String> {
    if let Some(data) = body.get("data").and_then(Value::as_array) {
        return data
            .iter()
            .filter_map(|entry| entry.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
    }
    if let Some(list) = body.as_array() {
        return list
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string).or_else(|| {
                entry.get("id").and_then(Value::as_str).map(str::to_string)
            }))
            .collect();
    }
    Vec::new()
}

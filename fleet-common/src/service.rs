//! Shared service record type, owned by the Registry and projected by the
//! Router and Supervisor.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Liveness window: a service with no heartbeat or successful poll inside
/// this many seconds is no longer considered healthy.
pub const HEALTHY_WINDOW_SECS: f64 = 120.0;

/// Health status as last observed by the Registry's poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Unknown
    }
}

/// The Registry's central entity (spec §3 "Service record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub url: String,
    pub hostname: String,
    pub status: String,
    pub timestamp: String,
    pub last_heartbeat: f64,
    #[serde(default)]
    pub health_status: HealthStatus,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ServiceRecord {
    /// `is_healthy` ⇔ `status == "running"` ∧ `now − last_heartbeat < 120s`.
    pub fn is_healthy(&self) -> bool {
        self.status == "running" && now_secs() - self.last_heartbeat < HEALTHY_WINDOW_SECS
    }

    /// The `metadata.type` tag, used to pick a health-probe URL or spawn
    /// strategy. Absent or non-string values are treated as "other".
    pub fn service_type(&self) -> &str {
        self.metadata
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn is_static(&self) -> bool {
        self.metadata
            .get("static")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Serializable projection including the derived `is_healthy` field,
    /// as returned by every Registry endpoint that echoes a record.
    pub fn to_json(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("ServiceRecord always serializes");
        if let Value::Object(ref mut map) = value {
            map.insert("is_healthy".to_string(), Value::Bool(self.is_healthy()));
        }
        value
    }
}

/// Seconds since the Unix epoch, matching the original Python
/// `time.time()` semantics used for `last_heartbeat`.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// An RFC 3339 / ISO-8601 timestamp for the `timestamp` field.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, heartbeat_age_secs: f64) -> ServiceRecord {
        ServiceRecord {
            name: "svc-a".into(),
            host: "127.0.0.1".into(),
            port: 9000,
            url: "http://127.0.0.1:9000".into(),
            hostname: "localhost".into(),
            status: status.into(),
            timestamp: now_iso(),
            last_heartbeat: now_secs() - heartbeat_age_secs,
            health_status: HealthStatus::Unknown,
            metadata: Map::new(),
        }
    }

    #[test]
    fn healthy_iff_running_and_recent_heartbeat() {
        assert!(record("running", 0.0).is_healthy());
        assert!(record("running", 119.0).is_healthy());
        assert!(!record("running", 121.0).is_healthy());
        assert!(!record("stopped", 0.0).is_healthy());
    }

    #[test]
    fn service_type_defaults_to_empty() {
        assert_eq!(record("running", 0.0).service_type(), "");
    }

    #[test]
    fn static_flag_reads_metadata() {
        let mut r = record("running", 0.0);
        r.metadata.insert("static".into(), Value::Bool(true));
        assert!(r.is_static());
    }

    #[test]
    fn to_json_includes_derived_is_healthy() {
        let json = record("running", 0.0).to_json();
        assert_eq!(json["is_healthy"], Value::Bool(true));
        assert_eq!(json["name"], Value::String("svc-a".into()));
    }
}

//! In-memory service directory.
//!
//! Each record lives behind its own `DashMap` shard lock, so concurrent
//! mutations to *different* services never contend, while every mutation
//! to a *given* service (register, update, heartbeat, health-poll
//! result, delete) is serialized — satisfying spec §5's per-record
//! ordering guarantee without a single process-wide lock.

use dashmap::DashMap;
use fleet_common::{now_secs, HealthStatus, ServiceRecord};
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct ServiceStore {
    services: DashMap<String, ServiceRecord>,
}

/// Fields accepted by `POST /services` (spec §4.1).
#[derive(Debug, serde::Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub hostname: String,
    pub url: String,
    pub status: String,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Fields accepted by `PUT /services/{name}` — any subset.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UpdateRequest {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub hostname: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct HeartbeatRequest {
    pub status: Option<String>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    pub fn register(&self, req: RegisterRequest) -> ServiceRecord {
        let record = ServiceRecord {
            name: req.name.clone(),
            host: req.host,
            port: req.port,
            url: req.url,
            hostname: req.hostname,
            status: req.status,
            timestamp: req.timestamp.unwrap_or_else(fleet_common::now_iso),
            last_heartbeat: now_secs(),
            health_status: HealthStatus::Unknown,
            metadata: req.metadata,
        };
        self.services.insert(req.name, record.clone());
        record
    }

    pub fn update(&self, name: &str, req: UpdateRequest) -> Option<ServiceRecord> {
        let mut entry = self.services.get_mut(name)?;
        if let Some(host) = req.host {
            entry.host = host;
        }
        if let Some(port) = req.port {
            entry.port = port;
        }
        if let Some(hostname) = req.hostname {
            entry.hostname = hostname;
        }
        if let Some(url) = req.url {
            entry.url = url;
        }
        if let Some(status) = req.status {
            entry.status = status;
        }
        if let Some(metadata) = req.metadata {
            entry.metadata = metadata;
        }
        entry.last_heartbeat = now_secs();
        Some(entry.clone())
    }

    pub fn heartbeat(&self, name: &str, req: HeartbeatRequest) -> Option<()> {
        let mut entry = self.services.get_mut(name)?;
        entry.last_heartbeat = now_secs();
        if let Some(status) = req.status {
            entry.status = status;
        }
        Some(())
    }

    pub fn remove(&self, name: &str) -> Option<ServiceRecord> {
        self.services.remove(name).map(|(_, record)| record)
    }

    pub fn get(&self, name: &str) -> Option<ServiceRecord> {
        self.services.get(name).map(|r| r.clone())
    }

    pub fn list(&self) -> Vec<ServiceRecord> {
        self.services.iter().map(|r| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn healthy_count(&self) -> usize {
        self.services.iter().filter(|r| r.is_healthy()).count()
    }

    /// Applies a health-probe outcome: success refreshes `last_heartbeat`
    /// and marks the record healthy; failure only flips the status flag.
    pub fn set_health(&self, name: &str, healthy: bool) {
        if let Some(mut entry) = self.services.get_mut(name) {
            if healthy {
                entry.health_status = HealthStatus::Healthy;
                entry.last_heartbeat = now_secs();
            } else {
                entry.health_status = HealthStatus::Unhealthy;
            }
        }
    }

    /// Removes every record whose heartbeat is older than `ttl_secs`.
    /// Returns the names removed, for logging.
    pub fn evict_stale(&self, ttl_secs: f64) -> Vec<String> {
        let now = now_secs();
        let stale: Vec<String> = self
            .services
            .iter()
            .filter(|r| now - r.last_heartbeat > ttl_secs)
            .map(|r| r.name.clone())
            .collect();
        for name in &stale {
            self.services.remove(name);
        }
        stale
    }

    pub fn stats(&self) -> RegistryStats {
        let mut status_distribution = Map::new();
        let mut host_distribution = Map::new();
        let mut healthy = 0usize;
        for r in self.services.iter() {
            if r.is_healthy() {
                healthy += 1;
            }
            let status_count = status_distribution
                .entry(r.status.clone())
                .or_insert(Value::Number(0.into()));
            *status_count = Value::Number((status_count.as_i64().unwrap_or(0) + 1).into());
            let host_count = host_distribution
                .entry(r.host.clone())
                .or_insert(Value::Number(0.into()));
            *host_count = Value::Number((host_count.as_i64().unwrap_or(0) + 1).into());
        }
        RegistryStats {
            total: self.services.len(),
            healthy,
            status_distribution,
            host_distribution,
        }
    }
}

pub struct RegistryStats {
    pub total: usize,
    pub healthy: usize,
    pub status_distribution: Map<String, Value>,
    pub host_distribution: Map<String, Value>,
}

/// The computed health-probe target for a record, per spec §4.1: an
/// `openai-api` service is probed via its Supervisor's management port
/// (`port + 1`); every other type is probed at its own `url`.
pub fn probe_url(record: &ServiceRecord) -> String {
    if record.service_type() == "openai-api" {
        format!("http://{}:{}/health", record.host, record.port as u32 + 1)
    } else {
        format!("{}/health", record.url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(store: &ServiceStore, name: &str, metadata: Map<String, Value>) -> ServiceRecord {
        store.register(RegisterRequest {
            name: name.to_string(),
            host: "10.0.0.5".to_string(),
            port: 9000,
            hostname: "worker-a".to_string(),
            url: "http://10.0.0.5:9000".to_string(),
            status: "running".to_string(),
            timestamp: None,
            metadata,
        })
    }

    #[test]
    fn register_then_get_round_trips() {
        let store = ServiceStore::new();
        register(&store, "svc-a", Map::new());
        let fetched = store.get("svc-a").expect("just registered");
        assert_eq!(fetched.host, "10.0.0.5");
        assert_eq!(fetched.port, 9000);
    }

    #[test]
    fn delete_removes_and_is_idempotent() {
        let store = ServiceStore::new();
        register(&store, "svc-a", Map::new());
        assert!(store.remove("svc-a").is_some());
        assert!(store.remove("svc-a").is_none());
        assert!(store.get("svc-a").is_none());
    }

    #[test]
    fn probe_url_uses_management_port_for_openai_api_type() {
        let store = ServiceStore::new();
        let mut metadata = Map::new();
        metadata.insert("type".to_string(), Value::String("openai-api".to_string()));
        let record = register(&store, "svc-worker", metadata);
        assert_eq!(probe_url(&record), "http://10.0.0.5:9001/health");
    }

    #[test]
    fn probe_url_uses_own_url_for_other_types() {
        let store = ServiceStore::new();
        let mut metadata = Map::new();
        metadata.insert("type".to_string(), Value::String("babysitter".to_string()));
        let record = register(&store, "svc-supervisor", metadata);
        assert_eq!(probe_url(&record), "http://10.0.0.5:9000/health");
    }

    #[test]
    fn evict_stale_removes_only_expired_records() {
        let store = ServiceStore::new();
        register(&store, "fresh", Map::new());
        register(&store, "stale", Map::new());
        store.services.get_mut("stale").unwrap().last_heartbeat = now_secs() - 301.0;

        let removed = store.evict_stale(300.0);

        assert_eq!(removed, vec!["stale".to_string()]);
        assert!(store.get("fresh").is_some());
        assert!(store.get("stale").is_none());
    }

    #[test]
    fn set_health_failure_leaves_last_heartbeat_untouched() {
        let store = ServiceStore::new();
        register(&store, "svc-a", Map::new());
        let before = store.get("svc-a").unwrap().last_heartbeat;

        store.set_health("svc-a", false);

        let after = store.get("svc-a").unwrap();
        assert_eq!(after.health_status, HealthStatus::Unhealthy);
        assert_eq!(after.last_heartbeat, before);
    }

    #[test]
    fn heartbeat_updates_status_and_refreshes_timestamp() {
        let store = ServiceStore::new();
        register(&store, "svc-a", Map::new());
        store.services.get_mut("svc-a").unwrap().last_heartbeat -= 50.0;

        store
            .heartbeat(
                "svc-a",
                HeartbeatRequest {
                    status: Some("draining".to_string()),
                },
            )
            .expect("service exists");

        let record = store.get("svc-a").unwrap();
        assert_eq!(record.status, "draining");
        assert!(now_secs() - record.last_heartbeat < 1.0);
    }
}

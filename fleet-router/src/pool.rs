//! The Router's in-memory backend pool (spec §4.2, §5 selection-cursor
//! ordering guarantee).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};

/// One backend the Router can proxy to.
#[derive(Debug)]
pub struct PoolMember {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub url: String,
    pub weight: u32,
    pub healthy: AtomicBool,
    pub request_count: AtomicU64,
    pub error_count: AtomicU64,
    pub response_time: Mutex<Duration>,
    pub last_check: Mutex<Option<DateTime<Utc>>>,
    pub metadata: Map<String, Value>,
    pub static_entry: bool,
}

impl PoolMember {
    pub fn new(
        name: String,
        host: String,
        port: u16,
        url: String,
        weight: u32,
        metadata: Map<String, Value>,
        static_entry: bool,
    ) -> Self {
        Self {
            name,
            host,
            port,
            url,
            weight: weight.max(1),
            healthy: AtomicBool::new(true),
            request_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            response_time: Mutex::new(Duration::ZERO),
            last_check: Mutex::new(None),
            metadata,
            static_entry,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn is_static(&self) -> bool {
        self.static_entry
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "host": self.host,
            "port": self.port,
            "url": self.url,
            "weight": self.weight,
            "healthy": self.is_healthy(),
            "request_count": self.request_count.load(Ordering::Relaxed),
            "error_count": self.error_count.load(Ordering::Relaxed),
            "response_time_ms": self.response_time.lock().unwrap().as_millis() as u64,
            "last_check": self.last_check.lock().unwrap().map(|t| t.to_rfc3339()),
            "static": self.static_entry,
        })
    }
}

/// Every backend the Router currently knows about, insertion-order
/// preserved for the WRR tie-break, plus the single cursor shared by
/// every request handler.
#[derive(Default)]
pub struct Pool {
    members: DashMap<String, Arc<PoolMember>>,
    order: Mutex<Vec<String>>,
    pub cursor: AtomicU64,
}

impl Pool {
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            order: Mutex::new(Vec::new()),
            cursor: AtomicU64::new(0),
        }
    }

    pub fn upsert(&self, member: PoolMember) {
        let name = member.name.clone();
        if self.members.insert(name.clone(), Arc::new(member)).is_none() {
            self.order.lock().unwrap().push(name);
        }
    }

    /// Refreshes the mutable fields of an already-known member in place,
    /// so in-flight counters (`request_count`, `error_count`) survive a
    /// sync that only changes `host`/`url`/`healthy`/`metadata`.
    pub fn refresh(
        &self,
        name: &str,
        host: String,
        port: u16,
        url: String,
        healthy: bool,
        metadata: Map<String, Value>,
    ) {
        if let Some(member) = self.members.get(name) {
            member.healthy.store(healthy, Ordering::Relaxed);
            // host/port/url/metadata rarely change; rebuild the member so
            // all of its fields stay coherent, but keep the live counters.
            let refreshed = PoolMember {
                name: member.name.clone(),
                host,
                port,
                url,
                weight: member.weight,
                healthy: AtomicBool::new(healthy),
                request_count: AtomicU64::new(member.request_count.load(Ordering::Relaxed)),
                error_count: AtomicU64::new(member.error_count.load(Ordering::Relaxed)),
                response_time: Mutex::new(*member.response_time.lock().unwrap()),
                last_check: Mutex::new(*member.last_check.lock().unwrap()),
                metadata,
                static_entry: member.static_entry,
            };
            drop(member);
            self.members.insert(name.to_string(), Arc::new(refreshed));
        }
    }

    pub fn remove(&self, name: &str) {
        if self.members.remove(name).is_some() {
            self.order.lock().unwrap().retain(|n| n != name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<PoolMember>> {
        self.members.get(name).map(|m| m.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    /// All members, in insertion order — the order the WRR selection
    /// algorithm depends on.
    pub fn all(&self) -> Vec<Arc<PoolMember>> {
        self.order
            .lock()
            .unwrap()
            .iter()
            .filter_map(|name| self.members.get(name).map(|m| m.clone()))
            .collect()
    }

    /// Healthy members, in insertion order.
    pub fn healthy(&self) -> Vec<Arc<PoolMember>> {
        self.all().into_iter().filter(|m| m.is_healthy()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn healthy_count(&self) -> usize {
        self.healthy().len()
    }
}

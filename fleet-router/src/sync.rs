//! Registry-backed pool sync (spec §4.2 "Backend discovery", grounded
//! in the original `distributed_router.py::sync_with_registry`).

use serde_json::Value;

use crate::pool::{Pool, PoolMember};

/// One sync pass: fetch every healthy service from the Registry, upsert
/// known/unknown entries, and evict anything absent from the response
/// that isn't pinned static (spec §8 invariant 4).
pub async fn sync_once(pool: &Pool, registry_url: &str, http: &reqwest::Client) -> anyhow::Result<()> {
    let url = format!("{}/services?healthy=true", registry_url.trim_end_matches('/'));
    let response = http
        .get(&url)
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;

    let services = body["services"].as_array().cloned().unwrap_or_default();
    let mut seen = std::collections::HashSet::new();

    for service in &services {
        let Some(name) = service["name"].as_str() else {
            continue;
        };
        seen.insert(name.to_string());

        let host = service["host"].as_str().unwrap_or_default().to_string();
        let port = service["port"].as_u64().unwrap_or(0) as u16;
        let url = service["url"].as_str().unwrap_or_default().to_string();
        let healthy = service["is_healthy"].as_bool().unwrap_or(true);
        let metadata = service["metadata"]
            .as_object()
            .cloned()
            .unwrap_or_default();
        let weight = metadata
            .get("weight")
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32;

        if pool.contains(name) {
            pool.refresh(name, host, port, url, healthy, metadata);
        } else {
            pool.upsert(PoolMember::new(
                name.to_string(),
                host,
                port,
                url,
                weight,
                metadata,
                false,
            ));
        }
    }

    for name in pool.names() {
        if seen.contains(&name) {
            continue;
        }
        if let Some(member) = pool.get(&name) {
            if member.is_static() {
                continue;
            }
        }
        pool.remove(&name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolMember;
    use serde_json::Map;

    #[test]
    fn static_members_are_never_evicted_by_name_check() {
        // sync_once's eviction predicate is exercised directly here
        // rather than through a live registry: a static member absent
        // from the response set must survive.
        let pool = Pool::new();
        pool.upsert(PoolMember::new(
            "pinned".to_string(),
            "10.0.0.9".to_string(),
            9000,
            "http://10.0.0.9:9000".to_string(),
            1,
            Map::new(),
            true,
        ));
        let seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        for name in pool.names() {
            if seen.contains(&name) {
                continue;
            }
            if let Some(member) = pool.get(&name) {
                if member.is_static() {
                    continue;
                }
            }
            pool.remove(&name);
        }
        assert!(pool.contains("pinned"));
    }
}

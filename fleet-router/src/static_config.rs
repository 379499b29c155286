//! Static backend configuration file (spec §6 "Static service
//! configuration file").

use fleet_common::FleetError;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::pool::{Pool, PoolMember};

#[derive(Debug, Deserialize)]
pub struct StaticServicesFile {
    #[serde(default)]
    pub services: Vec<StaticServiceConfig>,
}

/// A single static entry. `max_fails`/`fail_timeout`/`backup` are
/// nginx-upstream-style fields the wire format accepts but which the
/// Router's own selection and eviction logic does not interpret; they
/// are folded into `metadata` so dropping a file a user wrote would not
/// silently discard fields they expect to round-trip through `/stats`.
#[derive(Debug, Deserialize)]
pub struct StaticServiceConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub max_fails: Option<u32>,
    pub fail_timeout: Option<u32>,
    pub backup: Option<bool>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_weight() -> u32 {
    1
}

/// Loads a static-services file, if configured, and injects every entry
/// into the pool with `metadata.static = true`. A missing or malformed
/// file is startup-fatal (spec §7): the caller surfaces it via `main`'s
/// `anyhow::Result` and the process exits non-zero rather than starting
/// with a silently empty static pool.
pub fn load_into_pool(path: &str, pool: &Pool) -> Result<usize, FleetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| FleetError::ConfigIo {
        path: path.to_string(),
        source,
    })?;
    let file: StaticServicesFile =
        serde_json::from_str(&raw).map_err(|source| FleetError::ConfigParse {
            path: path.to_string(),
            source,
        })?;
    let count = file.services.len();

    for entry in file.services {
        let mut metadata = entry.metadata;
        metadata.insert("static".to_string(), Value::Bool(true));
        if let Some(max_fails) = entry.max_fails {
            metadata.insert("max_fails".to_string(), Value::from(max_fails));
        }
        if let Some(fail_timeout) = entry.fail_timeout {
            metadata.insert("fail_timeout".to_string(), Value::from(fail_timeout));
        }
        if let Some(backup) = entry.backup {
            metadata.insert("backup".to_string(), Value::Bool(backup));
        }

        let url = format!("http://{}:{}", entry.host, entry.port);
        pool.upsert(PoolMember::new(
            entry.name,
            entry.host,
            entry.port,
            url,
            entry.weight,
            metadata,
            true,
        ));
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_entries_and_marks_them_static() {
        let mut file = tempfile_with(
            r#"{"services":[{"name":"a","host":"10.0.0.1","port":9000,"weight":2},
                             {"name":"b","host":"10.0.0.2","port":9001,
                              "max_fails":3,"fail_timeout":30,"backup":true}]}"#,
        );
        let pool = Pool::new();
        let count = load_into_pool(file_path(&mut file), &pool).unwrap();
        assert_eq!(count, 2);

        let a = pool.get("a").unwrap();
        assert_eq!(a.weight, 2);
        assert!(a.is_static());

        let b = pool.get("b").unwrap();
        assert_eq!(b.weight, 1);
        assert_eq!(b.metadata["max_fails"], 3);
        assert_eq!(b.metadata["backup"], Value::Bool(true));
    }

    #[test]
    fn missing_file_is_a_config_io_error() {
        let pool = Pool::new();
        let err = load_into_pool("/nonexistent/static-services.json", &pool).unwrap_err();
        assert!(matches!(err, FleetError::ConfigIo { .. }));
    }

    #[test]
    fn malformed_json_is_a_config_parse_error() {
        let mut file = tempfile_with("not json");
        let pool = Pool::new();
        let err = load_into_pool(file_path(&mut file), &pool).unwrap_err();
        assert!(matches!(err, FleetError::ConfigParse { .. }));
    }

    fn tempfile_with(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    fn file_path(f: &mut tempfile::NamedTempFile) -> &str {
        f.path().to_str().unwrap()
    }
}

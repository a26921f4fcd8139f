//! Best-effort local persistence: one JSON file per key, each wrapped in a
//! `{value, timestamp}` envelope. Storage trouble never propagates to the
//! caller; the feature silently degrades to "no persistence".

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use board_logging::board_warn;
use serde_json::{json, Value};

use crate::persist::atomic_write;

/// Well-known cache keys. The scrape form and the results browser write
/// disjoint keys; the refresh signal is the single shared slot.
pub mod keys {
    pub const RESULTS_VIEW: &str = "results_view";
    pub const SCRAPE_STAGING: &str = "scrape_staging";
    pub const REFRESH_SIGNAL: &str = "refresh_signal";
    pub const UNLOCK: &str = "unlock";
    pub const API_CREDENTIAL: &str = "api_credential";
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    /// Unix seconds at write time. Defaults to "now" when the stored payload
    /// omits or corrupts it. Staleness is the caller's concern; there is no
    /// TTL here.
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Read one entry. Missing files, malformed JSON, and envelopes without a
    /// `value` key all read as `None` rather than erroring.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                board_warn!("cache read {key} failed: {err}");
                return None;
            }
        };
        let envelope: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                board_warn!("cache entry {key} is not valid JSON: {err}");
                return None;
            }
        };
        let object = envelope.as_object()?;
        let value = object.get("value")?.clone();
        let timestamp = object
            .get("timestamp")
            .and_then(Value::as_i64)
            .unwrap_or_else(now_unix);
        Some(CacheEntry { value, timestamp })
    }

    /// Write one entry. Failures (unwritable directory, quota) are logged and
    /// swallowed.
    pub fn write(&self, key: &str, value: &Value) {
        let envelope = json!({ "value": value, "timestamp": now_unix() });
        let path = self.path_for(key);
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return,
        };
        if let Err(err) = atomic_write(&self.dir, &filename, &envelope.to_string()) {
            board_warn!("cache write {key} failed: {err}");
        }
    }

    /// Remove one entry. Absent entries and IO failures are both fine.
    pub fn clear(&self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => board_warn!("cache clear {key} failed: {err}"),
        }
    }
}

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

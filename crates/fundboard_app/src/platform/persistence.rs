//! Load/save glue between the cache store and the core's persistable state.
//! Unusable payloads read as defaults; persistence trouble never interrupts
//! the session.

use board_logging::board_warn;
use fundboard_core::{StagingState, ViewSnapshot};
use fundboard_engine::{keys, CacheStore};
use serde_json::Value;

pub(crate) fn load_view(cache: &CacheStore) -> ViewSnapshot {
    let Some(entry) = cache.read(keys::RESULTS_VIEW) else {
        return ViewSnapshot::default();
    };
    match serde_json::from_value(entry.value) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            board_warn!("persisted view state unusable, starting fresh: {err}");
            ViewSnapshot::default()
        }
    }
}

pub(crate) fn save_view(cache: &CacheStore, snapshot: &ViewSnapshot) {
    match serde_json::to_value(snapshot) {
        Ok(value) => cache.write(keys::RESULTS_VIEW, &value),
        Err(err) => board_warn!("view state encode failed: {err}"),
    }
}

pub(crate) fn load_staging(cache: &CacheStore) -> StagingState {
    let Some(entry) = cache.read(keys::SCRAPE_STAGING) else {
        return StagingState::default();
    };
    match serde_json::from_value(entry.value) {
        Ok(staging) => staging,
        Err(err) => {
            board_warn!("persisted staging state unusable, starting fresh: {err}");
            StagingState::default()
        }
    }
}

pub(crate) fn save_staging(cache: &CacheStore, staging: &StagingState) {
    match serde_json::to_value(staging) {
        Ok(value) => cache.write(keys::SCRAPE_STAGING, &value),
        Err(err) => board_warn!("staging state encode failed: {err}"),
    }
}

pub(crate) fn save_credential(cache: &CacheStore, key: &str) {
    cache.write(keys::API_CREDENTIAL, &Value::String(key.to_string()));
}

pub(crate) fn load_credential(cache: &CacheStore) -> Option<String> {
    cache
        .read(keys::API_CREDENTIAL)
        .and_then(|entry| entry.value.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn view_snapshot_round_trips_through_the_cache() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        let mut snapshot = ViewSnapshot::default();
        snapshot.filters.search = "hospice".into();
        snapshot.show_evidence = true;
        save_view(&cache, &snapshot);

        assert_eq!(load_view(&cache), snapshot);
    }

    #[test]
    fn corrupt_view_state_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());
        fs::write(
            temp.path().join("results_view.json"),
            r#"{"value": {"filters": "not an object"}, "timestamp": 1}"#,
        )
        .unwrap();

        assert_eq!(load_view(&cache), ViewSnapshot::default());
    }

    #[test]
    fn staging_and_credential_round_trip() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        let mut staging = StagingState::default();
        staging.add_urls(vec!["https://a.org".into()]);
        save_staging(&cache, &staging);
        assert_eq!(load_staging(&cache), staging);

        assert_eq!(load_credential(&cache), None);
        save_credential(&cache, "sk-test");
        assert_eq!(load_credential(&cache).as_deref(), Some("sk-test"));
    }
}

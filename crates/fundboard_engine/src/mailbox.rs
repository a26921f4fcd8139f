//! The force-refresh signal as an explicit single-slot mailbox: the scrape
//! form publishes once per completed job, the results browser takes (reads
//! and clears) on its own cycle. Making the one-shot contract a type keeps it
//! from being a convention buried in cache-key usage.

use board_logging::board_warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{keys, now_unix, CacheStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSignal {
    pub job_id: String,
    /// Unix seconds when the job was observed complete.
    pub completed_at: i64,
}

#[derive(Debug, Clone)]
pub struct RefreshMailbox {
    store: CacheStore,
}

impl RefreshMailbox {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Publish a completion signal, replacing any unread one.
    pub fn publish(&self, job_id: &str) {
        let signal = RefreshSignal {
            job_id: job_id.to_string(),
            completed_at: now_unix(),
        };
        match serde_json::to_value(&signal) {
            Ok(value) => self.store.write(keys::REFRESH_SIGNAL, &value),
            Err(err) => board_warn!("refresh signal encode failed: {err}"),
        }
    }

    /// Take the pending signal, clearing the slot either way. A malformed
    /// payload is dropped as if no signal were pending.
    pub fn take(&self) -> Option<RefreshSignal> {
        let entry = self.store.read(keys::REFRESH_SIGNAL)?;
        self.store.clear(keys::REFRESH_SIGNAL);
        match serde_json::from_value::<RefreshSignal>(entry.value) {
            Ok(signal) => Some(signal),
            Err(err) => {
                board_warn!("refresh signal payload malformed: {err}");
                None
            }
        }
    }

    /// Read the pending signal without consuming it. The reader is expected
    /// to follow up with [`RefreshMailbox::clear`] once it has acted.
    pub fn peek(&self) -> Option<RefreshSignal> {
        let entry = self.store.read(keys::REFRESH_SIGNAL)?;
        serde_json::from_value(entry.value).ok()
    }

    /// Clear without reading.
    pub fn clear(&self) {
        self.store.clear(keys::REFRESH_SIGNAL);
    }

    /// Whether a signal is pending, without consuming it.
    pub fn is_pending(&self) -> bool {
        self.store
            .read(keys::REFRESH_SIGNAL)
            .map(|entry| !matches!(entry.value, Value::Null))
            .unwrap_or(false)
    }
}

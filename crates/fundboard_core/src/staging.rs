//! URL staging for batch scrape submission: extraction from pasted text,
//! exact-string dedupe, queue statistics, and the server's prepare verdict.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

// HTTP(S) URLs embedded in arbitrary pasted text. Quotes and brackets end a
// match so `<https://a.org>` and `"https://a.org"` strip their wrappers.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>\(\)\[\]]+"#).expect("url pattern"));

/// Scan raw text for candidate URLs, collapsing exact duplicates while
/// preserving first-seen order.
pub fn extract_urls(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    URL_PATTERN
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub distinct_hosts: usize,
}

/// Recompute queue statistics. A URL that fails to parse still counts toward
/// the total but contributes no hostname.
pub fn queue_stats(urls: &[String]) -> QueueStats {
    let hosts: BTreeSet<String> = urls
        .iter()
        .filter_map(|raw| Url::parse(raw).ok())
        .filter_map(|url| url.host_str().map(|h| h.to_lowercase()))
        .collect();
    QueueStats {
        total: urls.len(),
        distinct_hosts: hosts.len(),
    }
}

/// The server's classification of a candidate batch, one verdict per URL,
/// plus the raw-to-canonical normalization map used when re-queuing an
/// already-processed URL for a rescrape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrepSummary {
    pub to_scrape: Vec<String>,
    pub already_processed: Vec<String>,
    pub duplicates_in_payload: Vec<String>,
    pub normalized_map: BTreeMap<String, String>,
}

/// Client-side staging state for the scrape form. Persisted between sessions
/// so a half-built queue survives a reload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StagingState {
    pub queue: Vec<String>,
    /// URLs the user explicitly re-queued despite being already processed;
    /// submitted alongside the batch as the rescrape list.
    pub rescrape: BTreeSet<String>,
    pub stats: QueueStats,
    /// Latest prepare verdict; superseded by the next prepare call or by a
    /// queue reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep: Option<PrepSummary>,
}

impl StagingState {
    /// Add extracted URLs to the queue, skipping exact duplicates. Returns
    /// how many were actually added.
    pub fn add_urls(&mut self, urls: Vec<String>) -> usize {
        let mut added = 0;
        for url in urls {
            if !self.queue.contains(&url) {
                self.queue.push(url);
                added += 1;
            }
        }
        if added > 0 {
            self.stats = queue_stats(&self.queue);
        }
        added
    }

    /// Remove one staged URL. Returns whether it was present.
    pub fn remove_url(&mut self, url: &str) -> bool {
        let before = self.queue.len();
        self.queue.retain(|staged| staged != url);
        self.rescrape.remove(url);
        let removed = self.queue.len() != before;
        if removed {
            self.stats = queue_stats(&self.queue);
        }
        removed
    }

    /// Reset the queue, its rescrape marks, and the prepare verdict.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.rescrape.clear();
        self.prep = None;
        self.stats = QueueStats::default();
    }

    /// Re-queue an already-processed URL for rescraping, using the canonical
    /// form from the last prepare verdict when one exists.
    pub fn mark_rescrape(&mut self, raw: &str) {
        let canonical = self
            .prep
            .as_ref()
            .and_then(|prep| prep.normalized_map.get(raw).cloned())
            .unwrap_or_else(|| raw.to_string());
        if !self.queue.contains(&canonical) {
            self.queue.push(canonical.clone());
            self.stats = queue_stats(&self.queue);
        }
        self.rescrape.insert(canonical);
    }
}

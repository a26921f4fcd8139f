use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::record::{ResultRecord, RowKey};
use crate::rows::RowState;
use crate::staging::StagingState;
use crate::view::{visible_rows, FilterState};
use crate::view_model::AppViewModel;

/// Which widget owns keyboard input on the results page. Table shortcuts are
/// suppressed while the search entry has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    Search,
}

/// The persisted slice of results-view state: everything needed to restore
/// the browser exactly as the user left it, minus the records themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub filters: FilterState,
    #[serde(default)]
    pub show_evidence: bool,
    #[serde(default)]
    pub pinned: Option<RowKey>,
    #[serde(default)]
    pub expanded: BTreeSet<RowKey>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ResultsState {
    pub records: Vec<ResultRecord>,
    pub filters: FilterState,
    pub rows: RowState,
    pub show_evidence: bool,
    pub focus: Focus,
    /// Set once the persisted snapshot (or its default) has been applied;
    /// only then do mutations start writing back to the cache.
    pub hydrated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Tracking for the one in-flight batch job. Poll responses carry sequence
/// numbers; anything at or below `last_applied_seq` is stale and dropped.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JobTracker {
    pub job_id: String,
    pub status: Option<JobStatus>,
    pub last_applied_seq: u64,
    pub done_observed: bool,
}

impl JobTracker {
    pub fn new(job_id: String) -> Self {
        Self {
            job_id,
            status: None,
            last_applied_seq: 0,
            done_observed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ScrapeState {
    pub staging: StagingState,
    pub hydrated: bool,
    pub job: Option<JobTracker>,
    /// Idempotence guard: the last job id whose completion fired the
    /// refresh signal.
    pub last_completed_job: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) clock: DateTime<Utc>,
    pub(crate) results: ResultsState,
    pub(crate) scrape: ScrapeState,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            clock: DateTime::<Utc>::UNIX_EPOCH,
            results: ResultsState::default(),
            scrape: ScrapeState::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        crate::view_model::build(self)
    }

    /// Returns whether a render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Row keys for the full record set, in record order. Positions feed the
    /// fallback key for records with no identifying fields.
    pub(crate) fn all_keys(&self) -> Vec<RowKey> {
        self.results
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| RowKey::derive(record, position))
            .collect()
    }

    /// Row keys for the filtered, sorted view.
    pub(crate) fn visible_keys(&self) -> Vec<RowKey> {
        let keys = self.all_keys();
        visible_rows(&self.results.records, &self.results.filters, self.clock)
            .into_iter()
            .map(|index| keys[index].clone())
            .collect()
    }

    /// The filtered, sorted records themselves, for export.
    pub fn visible_records(&self) -> Vec<&ResultRecord> {
        visible_rows(&self.results.records, &self.results.filters, self.clock)
            .into_iter()
            .map(|index| &self.results.records[index])
            .collect()
    }

    pub(crate) fn view_snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            filters: self.results.filters.clone(),
            show_evidence: self.results.show_evidence,
            pinned: self.results.rows.pinned.clone(),
            expanded: self.results.rows.expanded.clone(),
        }
    }
}

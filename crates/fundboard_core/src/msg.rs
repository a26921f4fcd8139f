use chrono::{DateTime, Utc};

use crate::job::JobStatus;
use crate::record::{ResultRecord, RowKey};
use crate::staging::{PrepSummary, StagingState};
use crate::state::ViewSnapshot;
use crate::view::{Column, SortMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Clock tick; the pure engine never reads a wall clock itself.
    Tick(DateTime<Utc>),

    // Results browser.
    /// Restore persisted view state (or defaults) on load; marks hydration
    /// complete so later mutations start persisting.
    ViewRestored(ViewSnapshot),
    /// User asked for a (re)load; `force` bypasses the server's own cache.
    ResultsRequested { force: bool },
    ResultsLoaded(Vec<ResultRecord>),
    ResultsFailed(String),
    SearchChanged(String),
    EligibilityToggled(String),
    SortChanged(SortMode),
    ColumnFilterChanged { column: Column, query: String },
    FutureDeadlinesToggled,
    NonprofitsToggled,
    MinFundingChanged(String),
    FundingKeywordChanged(String),
    EvidenceToggled,
    SelectionMoved(isize),
    /// Enter on the keyboard cursor.
    PinSelected,
    ExpandToggled(RowKey),
    PinToggled(RowKey),
    SearchFocused,
    FocusReturned,
    /// The one-shot refresh mailbox held a signal for a completed job.
    RefreshSignalSeen { job_id: String },

    // Scrape form.
    StagingRestored(StagingState),
    UrlsPasted(String),
    QueueRemoved(String),
    QueueCleared,
    PrepareFinished(PrepSummary),
    PrepareFailed(String),
    RescrapeRequested(String),
    SubmitRequested,
    BatchSubmitted { job_id: String },
    BatchFailed(String),
    JobStatusArrived {
        job_id: String,
        /// Poll sequence number; stale responses are discarded.
        seq: u64,
        status: JobStatus,
    },
    JobCleared,
    SingleScrapeRequested(String),
    SingleScrapeDone,
    SingleScrapeFailed(String),

    // Settings.
    ApiKeyEntered(String),

    /// Fallback for placeholder wiring.
    NoOp,
}

use crate::staging::StagingState;
use crate::state::ViewSnapshot;

/// Side effects requested by `update`. The platform layer executes them;
/// the core never performs IO itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchResults { force: bool },
    ScrapeSingle { fund_url: String },
    PrepareUrls { fund_urls: Vec<String> },
    SubmitBatch {
        fund_urls: Vec<String>,
        rescrape_urls: Vec<String>,
    },
    StartPolling { job_id: String },
    StopPolling { job_id: String },
    /// Write the one-shot force-refresh signal for a completed job.
    PublishRefreshSignal { job_id: String },
    ClearRefreshSignal,
    PersistView(ViewSnapshot),
    PersistStaging(StagingState),
    PersistCredential(String),
    PushApiKey(String),
}

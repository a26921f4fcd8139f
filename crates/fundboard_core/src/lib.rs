//! Fundboard core: pure state machine behind the funding-results browser and
//! the scrape form. No IO happens here; `update` turns messages into new
//! state plus effects for the platform layer to execute.
mod dates;
mod effect;
mod job;
mod money;
mod msg;
mod record;
mod rows;
mod staging;
mod state;
mod update;
mod view;
mod view_model;

pub use dates::{parse_flexible, sort_timestamp};
pub use effect::Effect;
pub use job::{
    classify_failure, group_failures, FailureGroup, JobFailure, JobStatus, UrlTiming,
};
pub use money::{max_amount, parse_amount};
pub use msg::Msg;
pub use record::{
    eligibility_rank, field, FieldValue, ResultRecord, RowKey, ELIGIBILITY_ORDER,
};
pub use rows::{key_message, Key, KeyPress, RowState};
pub use staging::{extract_urls, queue_stats, PrepSummary, QueueStats, StagingState};
pub use state::{AppState, Focus, ViewSnapshot};
pub use update::update;
pub use view::{visible_rows, Column, FilterState, SortMode};
pub use view_model::{
    AppViewModel, EligibilityMetrics, ResultsViewModel, RowView, ScrapeViewModel,
};

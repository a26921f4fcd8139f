use crate::job::JobStatus;
use crate::record::{field, ResultRecord, RowKey, ELIGIBILITY_ORDER};
use crate::staging::{PrepSummary, QueueStats};
use crate::state::{AppState, Focus};
use crate::view::{visible_rows, SortMode};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub results: ResultsViewModel,
    pub scrape: ScrapeViewModel,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsViewModel {
    /// Filtered, sorted rows in display order.
    pub rows: Vec<RowView>,
    pub metrics: EligibilityMetrics,
    pub sort: SortMode,
    pub search: String,
    pub focus: Focus,
    pub show_evidence: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<RowKey>,
    pub pinned: Option<RowKey>,
}

/// Display fields for one visible record. Absent fields stay `None`; the
/// renderer decides how to show a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: RowKey,
    pub fund_name: Option<String>,
    pub fund_url: Option<String>,
    pub eligibility: Option<String>,
    pub application_status: Option<String>,
    pub deadline: Option<String>,
    pub funding_range: Option<String>,
    pub geographic_scope: Option<String>,
    pub applicant_types: Option<String>,
    pub beneficiary_focus: Option<String>,
    pub restrictions: Option<String>,
    pub notes: Option<String>,
    pub evidence: Option<String>,
    pub error: Option<String>,
    pub selected: bool,
    pub pinned: bool,
    pub expanded: bool,
}

/// Headline counts over the *visible* rows: total plus one count per known
/// eligibility label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EligibilityMetrics {
    pub total: usize,
    pub counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrapeViewModel {
    pub queue: Vec<String>,
    pub rescrape: Vec<String>,
    pub stats: QueueStats,
    pub prep: Option<PrepSummary>,
    pub job: Option<JobStatus>,
    pub error: Option<String>,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let results = &state.results;
    let order = visible_rows(&results.records, &results.filters, state.clock);

    let mut metrics = EligibilityMetrics {
        total: order.len(),
        counts: ELIGIBILITY_ORDER
            .iter()
            .map(|label| (label.to_string(), 0))
            .collect(),
    };
    let rows: Vec<RowView> = order
        .into_iter()
        .map(|index| {
            let record = &results.records[index];
            if let Some(label) = record.text(field::ELIGIBILITY) {
                if let Some(slot) = metrics.counts.iter_mut().find(|(l, _)| *l == label) {
                    slot.1 += 1;
                }
            }
            row_view(record, RowKey::derive(record, index), state)
        })
        .collect();

    AppViewModel {
        results: ResultsViewModel {
            rows,
            metrics,
            sort: results.filters.sort,
            search: results.filters.search.clone(),
            focus: results.focus,
            show_evidence: results.show_evidence,
            loading: results.loading,
            error: results.error.clone(),
            selected: results.rows.selected.clone(),
            pinned: results.rows.pinned.clone(),
        },
        scrape: ScrapeViewModel {
            queue: state.scrape.staging.queue.clone(),
            rescrape: state.scrape.staging.rescrape.iter().cloned().collect(),
            stats: state.scrape.staging.stats,
            prep: state.scrape.staging.prep.clone(),
            job: state
                .scrape
                .job
                .as_ref()
                .and_then(|tracker| tracker.status.clone()),
            error: state.scrape.error.clone(),
        },
    }
}

fn row_view(record: &ResultRecord, key: RowKey, state: &AppState) -> RowView {
    let rows = &state.results.rows;
    let selected = rows.selected.as_ref() == Some(&key);
    let pinned = rows.pinned.as_ref() == Some(&key);
    let expanded = rows.is_expanded(&key);
    RowView {
        fund_name: record.text(field::FUND_NAME),
        fund_url: record.text(field::FUND_URL),
        eligibility: record.text(field::ELIGIBILITY),
        application_status: record.text(field::APPLICATION_STATUS),
        deadline: record.text(field::DEADLINE),
        funding_range: record.text(field::FUNDING_RANGE),
        geographic_scope: record.text(field::GEOGRAPHIC_SCOPE),
        applicant_types: record.text(field::APPLICANT_TYPES),
        beneficiary_focus: record.text(field::BENEFICIARY_FOCUS),
        restrictions: record.text(field::RESTRICTIONS),
        notes: record.text(field::NOTES),
        evidence: record.text(field::EVIDENCE),
        error: record.text(field::ERROR),
        key,
        selected,
        pinned,
        expanded,
    }
}

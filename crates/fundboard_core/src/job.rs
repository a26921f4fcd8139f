//! Batch-job status as the client consumes it, plus failure grouping for the
//! end-of-run summary.

use crate::record::ResultRecord;

/// One poll's snapshot of a batch scrape job. Replaced wholesale on every
/// poll; never merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStatus {
    pub job_id: String,
    pub done: bool,
    /// Percent complete in `[0, 100]`.
    pub progress_percent: u8,
    /// Results accumulated so far; grows as URLs finish.
    pub results: Vec<ResultRecord>,
    pub errors: Vec<JobFailure>,
    pub current_url: Option<String>,
    pub current_elapsed_seconds: u64,
    pub total_elapsed_seconds: u64,
    pub total_urls: usize,
    pub completed_urls: usize,
    pub url_timings: Vec<UrlTiming>,
}

/// A per-URL failure inside a batch. One bad URL never aborts the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlTiming {
    pub url: String,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureGroup {
    Network,
    AccessHttp,
    Other,
}

impl FailureGroup {
    pub fn label(self) -> &'static str {
        match self {
            FailureGroup::Network => "Network",
            FailureGroup::AccessHttp => "Access/HTTP",
            FailureGroup::Other => "Other",
        }
    }
}

const NETWORK_MARKERS: [&str; 3] = ["Name or service", "Failed to establish", "timeout"];
const HTTP_MARKERS: [&str; 4] = ["403", "404", "429", "5"];

/// Bucket a failure message the way the run summary presents it. The HTTP
/// bucket's bare "5" marker matches any 5xx mention; it fires only after the
/// network markers have had their chance.
pub fn classify_failure(message: &str) -> FailureGroup {
    if NETWORK_MARKERS.iter().any(|m| message.contains(m)) {
        FailureGroup::Network
    } else if HTTP_MARKERS.iter().any(|m| message.contains(m)) {
        FailureGroup::AccessHttp
    } else {
        FailureGroup::Other
    }
}

/// Group a job's failures for display, preserving per-group arrival order.
pub fn group_failures(failures: &[JobFailure]) -> Vec<(FailureGroup, Vec<&JobFailure>)> {
    let mut groups: Vec<(FailureGroup, Vec<&JobFailure>)> = Vec::new();
    for failure in failures {
        let group = classify_failure(&failure.message);
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, members)) => members.push(failure),
            None => groups.push((group, vec![failure])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::{classify_failure, FailureGroup};

    #[test]
    fn network_markers_win_over_http_digits() {
        assert_eq!(
            classify_failure("Name or service not known (port 5000)"),
            FailureGroup::Network
        );
        assert_eq!(classify_failure("read timeout"), FailureGroup::Network);
    }

    #[test]
    fn http_statuses_group_together() {
        assert_eq!(classify_failure("HTTP 404 Not Found"), FailureGroup::AccessHttp);
        assert_eq!(classify_failure("got 503"), FailureGroup::AccessHttp);
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(classify_failure("no text extracted"), FailureGroup::Other);
    }
}

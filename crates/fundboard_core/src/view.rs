//! The result filter/sort/search engine: a pure mapping from a record set
//! plus a filter configuration to an ordered list of visible rows.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::money;
use crate::record::{eligibility_rank, field, ResultRecord, ELIGIBILITY_ORDER};

/// Deadline phrases that count as always-open regardless of any date.
const OPEN_DEADLINE_MARKERS: [&str; 3] = ["rolling", "ongoing", "open"];

/// Applicant-type phrases that mark a funder as open to nonprofits.
const NONPROFIT_KEYWORDS: [&str; 8] = [
    "nonprofit",
    "non-profit",
    "non profit",
    "charity",
    "charitable",
    "not-for-profit",
    "not for profit",
    "ngo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Recent,
    Alphabetical,
    Eligibility,
}

/// Named per-column filters. Each binds one or more record fields; a record
/// passes when any bound field matches the filter's query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Fund,
    Eligibility,
    Status,
    Deadline,
    Funding,
    Scope,
    Applicants,
    Beneficiaries,
    Restrictions,
    Notes,
    Evidence,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Fund,
        Column::Eligibility,
        Column::Status,
        Column::Deadline,
        Column::Funding,
        Column::Scope,
        Column::Applicants,
        Column::Beneficiaries,
        Column::Restrictions,
        Column::Notes,
        Column::Evidence,
    ];

    /// Record fields this filter searches. The fund column deliberately spans
    /// both the display name and the URL.
    pub fn accessors(self) -> &'static [&'static str] {
        match self {
            Column::Fund => &[field::FUND_NAME, field::FUND_URL],
            Column::Eligibility => &[field::ELIGIBILITY],
            Column::Status => &[field::APPLICATION_STATUS],
            Column::Deadline => &[field::DEADLINE],
            Column::Funding => &[field::FUNDING_RANGE],
            Column::Scope => &[field::GEOGRAPHIC_SCOPE],
            Column::Applicants => &[field::APPLICANT_TYPES],
            Column::Beneficiaries => &[field::BENEFICIARY_FOCUS],
            Column::Restrictions => &[field::RESTRICTIONS],
            Column::Notes => &[field::NOTES],
            Column::Evidence => &[field::EVIDENCE],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Fund => "fund",
            Column::Eligibility => "eligibility",
            Column::Status => "status",
            Column::Deadline => "deadline",
            Column::Funding => "funding",
            Column::Scope => "scope",
            Column::Applicants => "applicants",
            Column::Beneficiaries => "beneficiaries",
            Column::Restrictions => "restrictions",
            Column::Notes => "notes",
            Column::Evidence => "evidence",
        }
    }

    pub fn parse(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// The persistable filter/sort configuration of the results browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Allowed eligibility labels. An empty set means "no restriction", not
    /// "exclude everything"; an all-empty initial state must never hide the
    /// whole table.
    pub eligibility: BTreeSet<String>,
    pub search: String,
    pub column_filters: BTreeMap<Column, String>,
    pub future_deadlines_only: bool,
    pub nonprofits_only: bool,
    /// Free-text minimum funding threshold ("50k", "$50,000"). Unparseable
    /// text deactivates the threshold filter.
    pub min_funding: String,
    pub funding_keyword: String,
    pub sort: SortMode,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            eligibility: ELIGIBILITY_ORDER.iter().map(|s| s.to_string()).collect(),
            search: String::new(),
            column_filters: BTreeMap::new(),
            future_deadlines_only: false,
            nonprofits_only: false,
            min_funding: String::new(),
            funding_keyword: String::new(),
            sort: SortMode::default(),
        }
    }
}

/// Apply every configured filter stage, then sort. Returns indices into
/// `records` in display order. Deterministic and side-effect-free; the
/// current instant is an explicit input so the future-deadline stage cannot
/// read a clock behind the caller's back.
pub fn visible_rows(
    records: &[ResultRecord],
    filters: &FilterState,
    now: DateTime<Utc>,
) -> Vec<usize> {
    let search = filters.search.trim().to_lowercase();
    let min_funding = money::parse_amount(&filters.min_funding);
    let funding_keyword = filters.funding_keyword.trim().to_lowercase();
    let column_filters: Vec<(Column, String)> = filters
        .column_filters
        .iter()
        .filter_map(|(column, query)| {
            let query = query.trim().to_lowercase();
            (!query.is_empty()).then_some((*column, query))
        })
        .collect();

    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            passes_eligibility(record, &filters.eligibility)
                && passes_search(record, &search)
                && passes_columns(record, &column_filters)
                && (!filters.future_deadlines_only || deadline_is_open(record, now))
                && (!filters.nonprofits_only || mentions_nonprofit(record))
                && passes_min_funding(record, min_funding)
                && passes_funding_keyword(record, &funding_keyword)
        })
        .map(|(index, _)| index)
        .collect();

    // All three sorts are stable, so records that compare equal keep their
    // incoming order.
    match filters.sort {
        SortMode::Alphabetical => {
            rows.sort_by_key(|&i| alphabetical_key(&records[i]));
        }
        SortMode::Eligibility => {
            rows.sort_by_key(|&i| {
                eligibility_rank(records[i].text(field::ELIGIBILITY).as_deref())
            });
        }
        SortMode::Recent => {
            rows.sort_by_key(|&i| Reverse(dates::sort_timestamp(&records[i])));
        }
    }
    rows
}

fn passes_eligibility(record: &ResultRecord, allowed: &BTreeSet<String>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match record.text(field::ELIGIBILITY) {
        Some(label) => allowed.contains(label.as_str()),
        None => false,
    }
}

fn passes_search(record: &ResultRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record
        .values()
        .filter_map(|value| value.as_text())
        .any(|text| text.to_lowercase().contains(query))
}

fn passes_columns(record: &ResultRecord, filters: &[(Column, String)]) -> bool {
    filters.iter().all(|(column, query)| {
        column.accessors().iter().any(|name| {
            record
                .text(name)
                .is_some_and(|text| text.to_lowercase().contains(query))
        })
    })
}

fn deadline_is_open(record: &ResultRecord, now: DateTime<Utc>) -> bool {
    let Some(deadline) = record.text(field::DEADLINE) else {
        return false;
    };
    let lowered = deadline.to_lowercase();
    if OPEN_DEADLINE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return true;
    }
    dates::parse_flexible(&deadline).is_some_and(|date| date >= now)
}

fn mentions_nonprofit(record: &ResultRecord) -> bool {
    let Some(types) = record.text(field::APPLICANT_TYPES) else {
        return false;
    };
    let lowered = types.to_lowercase();
    NONPROFIT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

fn passes_min_funding(record: &ResultRecord, minimum: Option<f64>) -> bool {
    let Some(minimum) = minimum else {
        // Unparseable or empty threshold: the stage is inactive.
        return true;
    };
    record
        .text(field::FUNDING_RANGE)
        .and_then(|text| money::max_amount(&text))
        .is_some_and(|max| max >= minimum)
}

fn passes_funding_keyword(record: &ResultRecord, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    let haystack = [field::FUNDING_RANGE, field::NOTES, field::RESTRICTIONS]
        .iter()
        .filter_map(|name| record.text(name))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    haystack.contains(keyword)
}

fn alphabetical_key(record: &ResultRecord) -> String {
    record
        .text(field::FUND_NAME)
        .filter(|name| !name.trim().is_empty())
        .or_else(|| record.text(field::FUND_URL))
        .unwrap_or_default()
        .to_lowercase()
}

use chrono::{DateTime, TimeZone, Utc};
use fundboard_core::{
    field, visible_rows, Column, FieldValue, FilterState, ResultRecord, SortMode,
    ELIGIBILITY_ORDER,
};

fn record(pairs: &[(&str, &str)]) -> ResultRecord {
    let mut record = ResultRecord::new();
    for (name, value) in pairs {
        record.set(*name, FieldValue::Text((*value).to_string()));
    }
    record
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn unfiltered() -> FilterState {
    FilterState {
        eligibility: Default::default(),
        ..FilterState::default()
    }
}

#[test]
fn empty_eligibility_set_equals_full_vocabulary() {
    let records: Vec<ResultRecord> = ELIGIBILITY_ORDER
        .iter()
        .map(|label| record(&[(field::ELIGIBILITY, label), (field::FUND_NAME, label)]))
        .collect();

    let mut none_selected = FilterState::default();
    none_selected.eligibility.clear();
    let all_selected = FilterState::default();
    assert_eq!(all_selected.eligibility.len(), ELIGIBILITY_ORDER.len());

    assert_eq!(
        visible_rows(&records, &none_selected, now()),
        visible_rows(&records, &all_selected, now()),
    );
}

#[test]
fn eligibility_allow_set_excludes_missing_and_unknown() {
    let records = vec![
        record(&[(field::ELIGIBILITY, "Eligible")]),
        record(&[(field::ELIGIBILITY, "Mystery Tier")]),
        record(&[(field::FUND_NAME, "No label at all")]),
    ];
    let filters = FilterState::default();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0]);
}

#[test]
fn search_spans_all_fields_and_joined_lists() {
    let mut listed = ResultRecord::new();
    listed.set(
        field::APPLICANT_TYPES,
        FieldValue::List(vec!["charity".into(), "school".into()]),
    );
    let records = vec![
        listed,
        record(&[(field::NOTES, "Capital works in Kent")]),
    ];

    let mut filters = unfiltered();
    filters.search = "charity, school".into();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0]);

    filters.search = "  KENT ".into();
    assert_eq!(visible_rows(&records, &filters, now()), vec![1]);

    filters.search = String::new();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0, 1]);
}

#[test]
fn column_filters_and_together_but_or_within_a_column() {
    let records = vec![
        record(&[
            (field::FUND_URL, "https://kentfoundation.org/grants"),
            (field::APPLICATION_STATUS, "open"),
        ]),
        record(&[
            (field::FUND_NAME, "Kent Community Fund"),
            (field::APPLICATION_STATUS, "closed"),
        ]),
    ];

    // The fund column matches on URL or name.
    let mut filters = unfiltered();
    filters.column_filters.insert(Column::Fund, "kent".into());
    assert_eq!(visible_rows(&records, &filters, now()), vec![0, 1]);

    // A second column filter must also hold.
    filters.column_filters.insert(Column::Status, "open".into());
    assert_eq!(visible_rows(&records, &filters, now()), vec![0]);
}

#[test]
fn future_deadline_filter_keeps_qualitative_and_upcoming() {
    let records = vec![
        record(&[(field::DEADLINE, "Rolling basis")]),
        record(&[(field::DEADLINE, "2025-07-01")]),
        record(&[(field::DEADLINE, "2024-01-01")]),
        record(&[(field::DEADLINE, "unclear")]),
        record(&[(field::FUND_NAME, "no deadline field")]),
    ];
    let mut filters = unfiltered();
    filters.future_deadlines_only = true;
    // The default recent sort puts the dated deadline ahead of the
    // qualitative one.
    assert_eq!(visible_rows(&records, &filters, now()), vec![1, 0]);
}

#[test]
fn nonprofit_filter_matches_keyword_list() {
    let records = vec![
        record(&[(field::APPLICANT_TYPES, "Registered charities and CICs")]),
        record(&[(field::APPLICANT_TYPES, "NGOs working overseas")]),
        record(&[(field::APPLICANT_TYPES, "Local authorities only")]),
        record(&[(field::FUND_NAME, "untyped")]),
    ];
    let mut filters = unfiltered();
    filters.nonprofits_only = true;
    assert_eq!(visible_rows(&records, &filters, now()), vec![0, 1]);
}

#[test]
fn min_funding_threshold_compares_against_range_maximum() {
    let records = vec![
        record(&[(field::FUNDING_RANGE, "£10k–£50k")]),
        record(&[(field::FUNDING_RANGE, "£1,000 - £10,000")]),
        record(&[(field::FUNDING_RANGE, "varies by programme")]),
        record(&[(field::FUND_NAME, "no range")]),
    ];
    let mut filters = unfiltered();
    filters.min_funding = "50k".into();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0]);
}

#[test]
fn unparseable_threshold_deactivates_the_stage() {
    let records = vec![
        record(&[(field::FUNDING_RANGE, "£500")]),
        record(&[(field::FUND_NAME, "no range")]),
    ];
    let mut filters = unfiltered();
    filters.min_funding = "tbd".into();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0, 1]);
}

#[test]
fn funding_keyword_searches_range_notes_and_restrictions() {
    let records = vec![
        record(&[(field::NOTES, "Capital projects preferred")]),
        record(&[(field::RESTRICTIONS, "No capital funding")]),
        record(&[(field::EVIDENCE, "capital mentioned only in evidence")]),
    ];
    let mut filters = unfiltered();
    filters.funding_keyword = " Capital ".into();
    assert_eq!(visible_rows(&records, &filters, now()), vec![0, 1]);
}

#[test]
fn recent_sort_orders_by_extraction_then_deadline_then_epoch() {
    let records = vec![
        record(&[(field::EXTRACTION_TIMESTAMP, "2024-01-01")]),
        record(&[(field::EXTRACTION_TIMESTAMP, "2024-06-01")]),
        record(&[(field::EXTRACTION_TIMESTAMP, "2023-12-01")]),
        record(&[(field::DEADLINE, "2024-03-01")]),
        record(&[(field::FUND_NAME, "undated")]),
    ];
    let filters = unfiltered();
    assert_eq!(visible_rows(&records, &filters, now()), vec![1, 3, 0, 2, 4]);
}

#[test]
fn eligibility_sort_ranks_best_first_and_unknown_last() {
    let records = vec![
        record(&[(field::ELIGIBILITY, "Not Eligible")]),
        record(&[(field::FUND_NAME, "unlabelled")]),
        record(&[(field::ELIGIBILITY, "Highly Eligible")]),
        record(&[(field::ELIGIBILITY, "Eligible")]),
    ];
    let mut filters = unfiltered();
    filters.sort = SortMode::Eligibility;
    assert_eq!(visible_rows(&records, &filters, now()), vec![2, 3, 0, 1]);
}

#[test]
fn alphabetical_sort_falls_back_to_url_and_ignores_case() {
    let records = vec![
        record(&[(field::FUND_NAME, "zebra trust")]),
        record(&[(field::FUND_URL, "https://apple.org")]),
        record(&[(field::FUND_NAME, "Apple Foundation")]),
    ];
    let mut filters = unfiltered();
    filters.sort = SortMode::Alphabetical;
    assert_eq!(visible_rows(&records, &filters, now()), vec![2, 1, 0]);
}

#[test]
fn view_computation_is_idempotent() {
    let records = vec![
        record(&[
            (field::FUND_NAME, "A"),
            (field::ELIGIBILITY, "Eligible"),
            (field::EXTRACTION_TIMESTAMP, "2024-06-01"),
        ]),
        record(&[
            (field::FUND_NAME, "B"),
            (field::ELIGIBILITY, "Highly Eligible"),
            (field::EXTRACTION_TIMESTAMP, "2024-01-01"),
        ]),
    ];
    let mut filters = FilterState::default();
    filters.search = "  ".into();
    let first = visible_rows(&records, &filters, now());
    let second = visible_rows(&records, &filters, now());
    assert_eq!(first, second);
}

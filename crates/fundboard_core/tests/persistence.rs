use fundboard_core::{Column, FilterState, SortMode, ViewSnapshot, ELIGIBILITY_ORDER};

#[test]
fn default_filters_allow_every_eligibility_label() {
    let filters = FilterState::default();
    assert_eq!(filters.eligibility.len(), ELIGIBILITY_ORDER.len());
    for label in ELIGIBILITY_ORDER {
        assert!(filters.eligibility.contains(label));
    }
    assert_eq!(filters.sort, SortMode::Recent);
}

#[test]
fn view_snapshot_round_trips_through_json() {
    let mut snapshot = ViewSnapshot::default();
    snapshot.filters.search = "hospice".into();
    snapshot.filters.min_funding = "50k".into();
    snapshot.filters.sort = SortMode::Eligibility;
    snapshot
        .filters
        .column_filters
        .insert(Column::Fund, "kent".into());
    snapshot.show_evidence = true;

    let encoded = serde_json::to_string(&snapshot).expect("encode");
    let decoded: ViewSnapshot = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(decoded, snapshot);
}

#[test]
fn sort_mode_and_columns_use_snake_case_names() {
    assert_eq!(serde_json::to_string(&SortMode::Recent).unwrap(), "\"recent\"");
    assert_eq!(serde_json::to_string(&Column::Fund).unwrap(), "\"fund\"");
    assert_eq!(Column::parse("beneficiaries"), Some(Column::Beneficiaries));
    assert_eq!(Column::parse("bogus"), None);
}

#[test]
fn snapshots_from_older_sessions_fill_missing_fields() {
    // A snapshot written before the evidence flag existed still loads.
    let legacy = r#"{"filters":{"eligibility":[],"search":"","column_filters":{},"future_deadlines_only":false,"nonprofits_only":false,"min_funding":"","funding_keyword":"","sort":"recent"}}"#;
    let decoded: ViewSnapshot = serde_json::from_str(legacy).expect("decode legacy");
    assert!(!decoded.show_evidence);
    assert_eq!(decoded.pinned, None);
    assert!(decoded.expanded.is_empty());
}

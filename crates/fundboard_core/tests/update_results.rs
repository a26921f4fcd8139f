use std::sync::Once;

use chrono::{TimeZone, Utc};
use fundboard_core::{
    field, update, AppState, Effect, FieldValue, Msg, ResultRecord, RowKey, ViewSnapshot,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(board_logging::initialize_for_tests);
}

fn record(name: &str, url: &str) -> ResultRecord {
    let mut record = ResultRecord::new();
    record.set(field::FUND_NAME, FieldValue::Text(name.to_string()));
    record.set(field::FUND_URL, FieldValue::Text(url.to_string()));
    record.set(
        field::ELIGIBILITY,
        FieldValue::Text("Eligible".to_string()),
    );
    record
}

fn hydrated_state() -> AppState {
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::Tick(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
    );
    let (state, effects) = update(state, Msg::ViewRestored(ViewSnapshot::default()));
    assert!(effects.is_empty());
    state
}

fn loaded_state() -> AppState {
    let state = hydrated_state();
    let records = vec![
        record("Alpha Trust", "https://alpha.org"),
        record("Beta Fund", "https://beta.org"),
    ];
    let (state, _) = update(state, Msg::ResultsLoaded(records));
    state
}

#[test]
fn mutations_before_hydration_do_not_persist() {
    init_logging();
    let state = AppState::new();
    let (_state, effects) = update(state, Msg::SearchChanged("alpha".into()));
    assert!(effects.is_empty());
}

#[test]
fn filter_mutations_persist_the_snapshot_after_hydration() {
    init_logging();
    let state = loaded_state();
    let (_state, effects) = update(state, Msg::SearchChanged("alpha".into()));
    match effects.as_slice() {
        [Effect::PersistView(snapshot)] => {
            assert_eq!(snapshot.filters.search, "alpha");
        }
        other => panic!("expected a single PersistView effect, got {other:?}"),
    }
}

#[test]
fn requesting_results_emits_fetch() {
    init_logging();
    let state = hydrated_state();
    let (state, effects) = update(state, Msg::ResultsRequested { force: false });
    assert_eq!(effects, vec![Effect::FetchResults { force: false }]);
    assert!(state.view().results.loading);
}

#[test]
fn fetch_failure_surfaces_an_inline_error() {
    init_logging();
    let state = hydrated_state();
    let (state, _) = update(state, Msg::ResultsRequested { force: false });
    let (state, effects) = update(state, Msg::ResultsFailed("status 502".into()));
    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.results.loading);
    assert_eq!(view.results.error.as_deref(), Some("status 502"));
}

#[test]
fn refresh_signal_clears_the_mailbox_and_forces_a_fetch() {
    init_logging();
    let state = loaded_state();
    let (_state, effects) = update(
        state,
        Msg::RefreshSignalSeen {
            job_id: "job-1".into(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::ClearRefreshSignal,
            Effect::FetchResults { force: true },
        ]
    );
}

#[test]
fn reloading_without_the_pinned_record_drops_the_pin() {
    init_logging();
    let mut state = loaded_state();
    let alpha = RowKey::derive(&record("Alpha Trust", "https://alpha.org"), 0);
    let (next, _) = update(state, Msg::PinToggled(alpha.clone()));
    state = next;
    assert_eq!(state.view().results.pinned.as_ref(), Some(&alpha));

    let (state, _) = update(
        state,
        Msg::ResultsLoaded(vec![record("Beta Fund", "https://beta.org")]),
    );
    assert_eq!(state.view().results.pinned, None);
}

#[test]
fn narrowing_the_view_snaps_selection_to_the_first_visible_row() {
    init_logging();
    let state = loaded_state();
    // Cursor onto the second row.
    let (state, _) = update(state, Msg::SelectionMoved(1));
    let (state, _) = update(state, Msg::SelectionMoved(1));
    let beta = RowKey::derive(&record("Beta Fund", "https://beta.org"), 1);
    assert_eq!(state.view().results.selected.as_ref(), Some(&beta));

    let (state, _) = update(state, Msg::SearchChanged("alpha".into()));
    let alpha = RowKey::derive(&record("Alpha Trust", "https://alpha.org"), 0);
    assert_eq!(state.view().results.selected.as_ref(), Some(&alpha));
}

#[test]
fn enter_pins_the_keyboard_cursor() {
    init_logging();
    let state = loaded_state();
    let (state, _) = update(state, Msg::SelectionMoved(1));
    let (state, effects) = update(state, Msg::PinSelected);

    let view = state.view();
    assert_eq!(view.results.pinned, view.results.selected);
    assert!(matches!(effects.as_slice(), [Effect::PersistView(_)]));
}

#[test]
fn expand_then_collapse_on_a_pinned_row_clears_both() {
    init_logging();
    let state = loaded_state();
    let alpha = RowKey::derive(&record("Alpha Trust", "https://alpha.org"), 0);
    let (state, _) = update(state, Msg::PinToggled(alpha.clone()));
    let (state, _) = update(state, Msg::ExpandToggled(alpha.clone()));

    let view = state.view();
    assert_eq!(view.results.pinned, None);
    let row = view
        .results
        .rows
        .iter()
        .find(|row| row.key == alpha)
        .expect("alpha row visible");
    assert!(!row.expanded);
}

#[test]
fn evidence_toggle_is_persisted() {
    init_logging();
    let state = loaded_state();
    let (state, effects) = update(state, Msg::EvidenceToggled);
    assert!(state.view().results.show_evidence);
    match effects.as_slice() {
        [Effect::PersistView(snapshot)] => assert!(snapshot.show_evidence),
        other => panic!("expected PersistView, got {other:?}"),
    }
}

#[test]
fn restored_snapshot_round_trips_into_the_view() {
    init_logging();
    let mut snapshot = ViewSnapshot::default();
    snapshot.filters.search = "hospice".into();
    snapshot.show_evidence = true;

    let state = AppState::new();
    let (state, _) = update(state, Msg::ViewRestored(snapshot));
    let view = state.view();
    assert_eq!(view.results.search, "hospice");
    assert!(view.results.show_evidence);
}

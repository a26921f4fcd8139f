use std::sync::Once;

use fundboard_core::{
    update, AppState, Effect, JobStatus, Msg, PrepSummary, StagingState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(board_logging::initialize_for_tests);
}

fn staged_state() -> AppState {
    let state = AppState::new();
    let (state, effects) = update(state, Msg::StagingRestored(StagingState::default()));
    assert!(effects.is_empty());
    state
}

fn status(job_id: &str, done: bool, percent: u8) -> JobStatus {
    JobStatus {
        job_id: job_id.to_string(),
        done,
        progress_percent: percent,
        ..JobStatus::default()
    }
}

fn poll(state: AppState, job_id: &str, seq: u64, done: bool, percent: u8) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::JobStatusArrived {
            job_id: job_id.to_string(),
            seq,
            status: status(job_id, done, percent),
        },
    )
}

#[test]
fn pasted_text_is_scanned_and_deduplicated() {
    init_logging();
    let state = staged_state();
    let raw = "https://a.org/grants\nnoise https://b.org/fund noise\nhttps://a.org/grants\n";
    let (state, effects) = update(state, Msg::UrlsPasted(raw.into()));

    let view = state.view();
    assert_eq!(view.scrape.queue.len(), 2);
    assert_eq!(view.scrape.stats.total, 2);
    assert_eq!(view.scrape.stats.distinct_hosts, 2);
    match effects.as_slice() {
        [Effect::PersistStaging(staging), Effect::PrepareUrls { fund_urls }] => {
            assert_eq!(staging.queue.len(), 2);
            assert_eq!(fund_urls.len(), 2);
        }
        other => panic!("expected persist + prepare, got {other:?}"),
    }
}

#[test]
fn pasting_only_known_urls_is_a_no_op() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(state, Msg::UrlsPasted("https://a.org".into()));
    let (state, effects) = update(state, Msg::UrlsPasted("https://a.org".into()));
    assert!(effects.is_empty());
    assert_eq!(state.view().scrape.queue.len(), 1);
}

#[test]
fn removing_the_last_url_drops_the_prepare_verdict() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(state, Msg::UrlsPasted("https://a.org".into()));
    let (state, _) = update(
        state,
        Msg::PrepareFinished(PrepSummary {
            to_scrape: vec!["https://a.org".into()],
            ..PrepSummary::default()
        }),
    );
    assert!(state.view().scrape.prep.is_some());

    let (state, _) = update(state, Msg::QueueRemoved("https://a.org".into()));
    let view = state.view();
    assert!(view.scrape.queue.is_empty());
    assert!(view.scrape.prep.is_none());
}

#[test]
fn rescrape_requeues_the_normalized_form() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(state, Msg::UrlsPasted("https://b.org".into()));
    let mut prep = PrepSummary::default();
    prep.already_processed.push("https://A.org/".into());
    prep.normalized_map
        .insert("https://A.org/".into(), "https://a.org".into());
    let (state, _) = update(state, Msg::PrepareFinished(prep));

    let (state, _) = update(state, Msg::RescrapeRequested("https://A.org/".into()));
    let view = state.view();
    assert!(view.scrape.queue.contains(&"https://a.org".to_string()));
    assert_eq!(view.scrape.rescrape, vec!["https://a.org".to_string()]);

    let (_state, effects) = update(state, Msg::SubmitRequested);
    match effects.as_slice() {
        [Effect::SubmitBatch {
            fund_urls,
            rescrape_urls,
        }] => {
            assert_eq!(fund_urls.len(), 2);
            assert_eq!(rescrape_urls, &vec!["https://a.org".to_string()]);
        }
        other => panic!("expected SubmitBatch, got {other:?}"),
    }
}

#[test]
fn submission_clears_staging_and_starts_polling() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(state, Msg::UrlsPasted("https://a.org".into()));
    let (state, effects) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-1".into(),
        },
    );

    assert!(state.view().scrape.queue.is_empty());
    match effects.as_slice() {
        [Effect::PersistStaging(staging), Effect::StartPolling { job_id }] => {
            assert!(staging.queue.is_empty());
            assert_eq!(job_id, "job-1");
        }
        other => panic!("expected persist + start polling, got {other:?}"),
    }
}

#[test]
fn a_new_job_supersedes_the_previous_poller() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-1".into(),
        },
    );
    let (_state, effects) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-2".into(),
        },
    );
    assert_eq!(effects.first(), Some(&Effect::StopPolling { job_id: "job-1".into() }));
    assert_eq!(effects.last(), Some(&Effect::StartPolling { job_id: "job-2".into() }));
}

#[test]
fn poll_snapshots_replace_wholesale_in_sequence_order() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-1".into(),
        },
    );
    let (state, _) = poll(state, "job-1", 1, false, 25);
    let (state, _) = poll(state, "job-1", 2, false, 75);
    let job = state.view().scrape.job.expect("job status");
    assert_eq!(job.progress_percent, 75);

    // A late, out-of-order response must not roll progress back.
    let (state, effects) = poll(state, "job-1", 1, false, 25);
    assert!(effects.is_empty());
    let job = state.view().scrape.job.expect("job status");
    assert_eq!(job.progress_percent, 75);
}

#[test]
fn foreign_job_ids_are_ignored() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-2".into(),
        },
    );
    let (state, effects) = poll(state, "job-1", 1, true, 100);
    assert!(effects.is_empty());
    assert!(state.view().scrape.job.is_none());
}

#[test]
fn completion_publishes_exactly_one_refresh_signal() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-1".into(),
        },
    );
    let (state, _) = poll(state, "job-1", 1, false, 50);
    let (state, effects) = poll(state, "job-1", 2, true, 100);
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling {
                job_id: "job-1".into()
            },
            Effect::PublishRefreshSignal {
                job_id: "job-1".into()
            },
        ]
    );

    // Observing done again for the same job id must not re-fire.
    let (_state, effects) = poll(state, "job-1", 3, true, 100);
    assert!(effects.is_empty());
}

#[test]
fn clearing_a_job_stops_its_poller() {
    init_logging();
    let state = staged_state();
    let (state, _) = update(
        state,
        Msg::BatchSubmitted {
            job_id: "job-1".into(),
        },
    );
    let (state, effects) = update(state, Msg::JobCleared);
    assert_eq!(
        effects,
        vec![Effect::StopPolling {
            job_id: "job-1".into()
        }]
    );
    assert!(state.view().scrape.job.is_none());
}

#[test]
fn api_key_is_pushed_and_cached() {
    init_logging();
    let state = AppState::new();
    let (_state, effects) = update(state, Msg::ApiKeyEntered("  sk-test-123  ".into()));
    assert_eq!(
        effects,
        vec![
            Effect::PushApiKey("sk-test-123".into()),
            Effect::PersistCredential("sk-test-123".into()),
        ]
    );
}

use std::collections::BTreeSet;

use crate::staging::extract_urls;
use crate::state::{AppState, Focus, JobTracker};
use crate::{Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Tick(now) => {
            state.clock = now;
            Vec::new()
        }

        // ----- results browser -----
        Msg::ViewRestored(snapshot) => {
            state.results.filters = snapshot.filters;
            state.results.show_evidence = snapshot.show_evidence;
            state.results.rows.pinned = snapshot.pinned;
            state.results.rows.expanded = snapshot.expanded;
            state.results.hydrated = true;
            refresh_rows(&mut state);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResultsRequested { force } => {
            state.results.loading = true;
            state.results.error = None;
            state.mark_dirty();
            vec![Effect::FetchResults { force }]
        }
        Msg::ResultsLoaded(records) => {
            state.results.records = records;
            state.results.loading = false;
            state.results.error = None;
            refresh_rows(&mut state);
            state.mark_dirty();
            persist_view(&state)
        }
        Msg::ResultsFailed(message) => {
            state.results.loading = false;
            state.results.error = Some(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchChanged(query) => {
            state.results.filters.search = query;
            filter_changed(&mut state)
        }
        Msg::EligibilityToggled(label) => {
            let allowed = &mut state.results.filters.eligibility;
            if !allowed.remove(&label) {
                allowed.insert(label);
            }
            filter_changed(&mut state)
        }
        Msg::SortChanged(sort) => {
            state.results.filters.sort = sort;
            filter_changed(&mut state)
        }
        Msg::ColumnFilterChanged { column, query } => {
            if query.trim().is_empty() {
                state.results.filters.column_filters.remove(&column);
            } else {
                state.results.filters.column_filters.insert(column, query);
            }
            filter_changed(&mut state)
        }
        Msg::FutureDeadlinesToggled => {
            state.results.filters.future_deadlines_only =
                !state.results.filters.future_deadlines_only;
            filter_changed(&mut state)
        }
        Msg::NonprofitsToggled => {
            state.results.filters.nonprofits_only = !state.results.filters.nonprofits_only;
            filter_changed(&mut state)
        }
        Msg::MinFundingChanged(text) => {
            state.results.filters.min_funding = text;
            filter_changed(&mut state)
        }
        Msg::FundingKeywordChanged(text) => {
            state.results.filters.funding_keyword = text;
            filter_changed(&mut state)
        }
        Msg::EvidenceToggled => {
            state.results.show_evidence = !state.results.show_evidence;
            state.mark_dirty();
            persist_view(&state)
        }
        Msg::SelectionMoved(delta) => {
            let visible = state.visible_keys();
            state.results.rows.move_selection(delta, &visible);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PinSelected => match state.results.rows.selected.clone() {
            Some(key) => {
                state.results.rows.toggle_pinned(&key);
                state.mark_dirty();
                persist_view(&state)
            }
            None => Vec::new(),
        },
        Msg::ExpandToggled(key) => {
            state.results.rows.toggle_expanded(&key);
            state.mark_dirty();
            persist_view(&state)
        }
        Msg::PinToggled(key) => {
            state.results.rows.toggle_pinned(&key);
            state.mark_dirty();
            persist_view(&state)
        }
        Msg::SearchFocused => {
            state.results.focus = Focus::Search;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FocusReturned => {
            state.results.focus = Focus::Table;
            state.mark_dirty();
            Vec::new()
        }
        Msg::RefreshSignalSeen { job_id: _ } => {
            state.results.loading = true;
            state.mark_dirty();
            vec![
                Effect::ClearRefreshSignal,
                Effect::FetchResults { force: true },
            ]
        }

        // ----- scrape form -----
        Msg::StagingRestored(staging) => {
            state.scrape.staging = staging;
            state.scrape.hydrated = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::UrlsPasted(raw) => {
            let urls = extract_urls(&raw);
            if urls.is_empty() {
                return (state, Vec::new());
            }
            if state.scrape.staging.add_urls(urls) == 0 {
                return (state, Vec::new());
            }
            state.mark_dirty();
            let mut effects = persist_staging(&state);
            effects.push(Effect::PrepareUrls {
                fund_urls: state.scrape.staging.queue.clone(),
            });
            effects
        }
        Msg::QueueRemoved(url) => {
            if !state.scrape.staging.remove_url(&url) {
                return (state, Vec::new());
            }
            if state.scrape.staging.queue.is_empty() {
                state.scrape.staging.prep = None;
            }
            state.mark_dirty();
            let mut effects = persist_staging(&state);
            if !state.scrape.staging.queue.is_empty() {
                effects.push(Effect::PrepareUrls {
                    fund_urls: state.scrape.staging.queue.clone(),
                });
            }
            effects
        }
        Msg::QueueCleared => {
            state.scrape.staging.clear();
            state.mark_dirty();
            persist_staging(&state)
        }
        Msg::PrepareFinished(prep) => {
            state.scrape.staging.prep = Some(prep);
            state.scrape.error = None;
            state.mark_dirty();
            persist_staging(&state)
        }
        Msg::PrepareFailed(message) => {
            state.scrape.error = Some(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RescrapeRequested(raw) => {
            state.scrape.staging.mark_rescrape(&raw);
            state.mark_dirty();
            persist_staging(&state)
        }
        Msg::SubmitRequested => {
            if state.scrape.staging.queue.is_empty() {
                return (state, Vec::new());
            }
            state.scrape.error = None;
            state.mark_dirty();
            vec![Effect::SubmitBatch {
                fund_urls: state.scrape.staging.queue.clone(),
                rescrape_urls: state.scrape.staging.rescrape.iter().cloned().collect(),
            }]
        }
        Msg::BatchSubmitted { job_id } => {
            let mut effects = Vec::new();
            // A new job supersedes any previous poller.
            if let Some(previous) = state.scrape.job.take() {
                effects.push(Effect::StopPolling {
                    job_id: previous.job_id,
                });
            }
            state.scrape.job = Some(JobTracker::new(job_id.clone()));
            state.scrape.staging.clear();
            state.mark_dirty();
            effects.extend(persist_staging(&state));
            effects.push(Effect::StartPolling { job_id });
            effects
        }
        Msg::BatchFailed(message) => {
            state.scrape.error = Some(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::JobStatusArrived {
            job_id,
            seq,
            status,
        } => {
            let applied = match state.scrape.job.as_mut() {
                Some(tracker)
                    if tracker.job_id == job_id && seq > tracker.last_applied_seq =>
                {
                    tracker.last_applied_seq = seq;
                    let first_done = status.done && !tracker.done_observed;
                    if first_done {
                        tracker.done_observed = true;
                    }
                    tracker.status = Some(status);
                    Some(first_done)
                }
                // Stale or foreign response; the newer snapshot stays.
                _ => None,
            };
            let Some(first_done) = applied else {
                return (state, Vec::new());
            };
            state.mark_dirty();
            let mut effects = Vec::new();
            if first_done {
                effects.push(Effect::StopPolling {
                    job_id: job_id.clone(),
                });
                if state.scrape.last_completed_job.as_deref() != Some(job_id.as_str()) {
                    state.scrape.last_completed_job = Some(job_id.clone());
                    effects.push(Effect::PublishRefreshSignal { job_id });
                }
            }
            effects
        }
        Msg::JobCleared => match state.scrape.job.take() {
            Some(tracker) => {
                state.mark_dirty();
                vec![Effect::StopPolling {
                    job_id: tracker.job_id,
                }]
            }
            None => Vec::new(),
        },
        Msg::SingleScrapeRequested(fund_url) => {
            state.scrape.error = None;
            state.mark_dirty();
            vec![Effect::ScrapeSingle { fund_url }]
        }
        Msg::SingleScrapeDone => {
            state.results.loading = true;
            state.mark_dirty();
            vec![Effect::FetchResults { force: true }]
        }
        Msg::SingleScrapeFailed(message) => {
            state.scrape.error = Some(message);
            state.mark_dirty();
            Vec::new()
        }

        // ----- settings -----
        Msg::ApiKeyEntered(key) => {
            let key = key.trim().to_string();
            if key.is_empty() {
                return (state, Vec::new());
            }
            vec![
                Effect::PushApiKey(key.clone()),
                Effect::PersistCredential(key),
            ]
        }

        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Re-anchor row state after the record set or the filter set changed: the
/// pin dies with its record, the cursor snaps back into the visible view.
fn refresh_rows(state: &mut AppState) {
    let all: BTreeSet<_> = state.all_keys().into_iter().collect();
    state.results.rows.prune_missing(&all);
    let visible = state.visible_keys();
    state.results.rows.sync_selection(&visible);
}

fn filter_changed(state: &mut AppState) -> Vec<Effect> {
    let visible = state.visible_keys();
    state.results.rows.sync_selection(&visible);
    state.mark_dirty();
    persist_view(state)
}

fn persist_view(state: &AppState) -> Vec<Effect> {
    if state.results.hydrated {
        vec![Effect::PersistView(state.view_snapshot())]
    } else {
        Vec::new()
    }
}

fn persist_staging(state: &AppState) -> Vec<Effect> {
    if state.scrape.hydrated {
        vec![Effect::PersistStaging(state.scrape.staging.clone())]
    } else {
        Vec::new()
    }
}

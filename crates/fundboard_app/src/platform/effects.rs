//! Effect execution and engine-event forwarding: the bridge between the pure
//! core and the engine's channels.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use board_logging::{board_info, board_warn};
use fundboard_core::{
    Effect, JobFailure, JobStatus, Msg, PrepSummary, ResultRecord, UrlTiming,
};
use fundboard_engine::{
    ApiClient, ApiCommand, ApiEvent, ApiHandle, CacheStore, JobPoller, JobStatusDto,
    PollEvent, PrepareDto, RefreshMailbox, RefreshSignal, POLL_INTERVAL,
};
use serde_json::Value;

use super::commands::Input;
use super::persistence;

pub(crate) struct EffectRunner {
    api: ApiHandle,
    client: ApiClient,
    cache: CacheStore,
    mailbox: RefreshMailbox,
    poller: Option<JobPoller>,
    poll_tx: mpsc::Sender<PollEvent>,
}

impl EffectRunner {
    pub fn new(client: ApiClient, cache: CacheStore, input_tx: mpsc::Sender<Input>) -> Self {
        let (api, api_events) = ApiHandle::new(client.clone());
        let (poll_tx, poll_rx) = mpsc::channel();
        let mailbox = RefreshMailbox::new(cache.clone());
        spawn_event_loop(input_tx, api_events, poll_rx);
        Self {
            api,
            client,
            cache,
            mailbox,
            poller: None,
            poll_tx,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchResults { force } => {
                    self.api.send(ApiCommand::FetchResults { force });
                }
                Effect::ScrapeSingle { fund_url } => {
                    self.api.send(ApiCommand::ScrapeSingle { fund_url });
                }
                Effect::PrepareUrls { fund_urls } => {
                    self.api.send(ApiCommand::PrepareUrls { fund_urls });
                }
                Effect::SubmitBatch {
                    fund_urls,
                    rescrape_urls,
                } => {
                    board_info!(
                        "submitting batch: {} urls, {} rescrapes",
                        fund_urls.len(),
                        rescrape_urls.len()
                    );
                    self.api.send(ApiCommand::SubmitBatch {
                        fund_urls,
                        rescrape_urls,
                    });
                }
                Effect::StartPolling { job_id } => {
                    board_info!("polling job {job_id}");
                    // One timer at a time: a new job supersedes the old poller.
                    if let Some(previous) = self.poller.take() {
                        previous.stop();
                    }
                    self.poller = Some(JobPoller::start(
                        Arc::new(self.client.clone()),
                        job_id,
                        POLL_INTERVAL,
                        self.poll_tx.clone(),
                    ));
                }
                Effect::StopPolling { job_id } => {
                    board_info!("stopping poll for job {job_id}");
                    if let Some(poller) = self.poller.take() {
                        poller.stop();
                    }
                }
                Effect::PublishRefreshSignal { job_id } => {
                    self.mailbox.publish(&job_id);
                }
                Effect::ClearRefreshSignal => {
                    self.mailbox.clear();
                }
                Effect::PersistView(snapshot) => {
                    persistence::save_view(&self.cache, &snapshot);
                }
                Effect::PersistStaging(staging) => {
                    persistence::save_staging(&self.cache, &staging);
                }
                Effect::PersistCredential(key) => {
                    persistence::save_credential(&self.cache, &key);
                }
                Effect::PushApiKey(key) => {
                    self.api.send(ApiCommand::PushApiKey { key });
                }
            }
        }
    }

    /// The results view watches the mailbox on its own cycle; the core clears
    /// it through an explicit effect once it has acted.
    pub fn peek_refresh_signal(&self) -> Option<RefreshSignal> {
        self.mailbox.peek()
    }
}

/// Forward engine events into the main loop's inbox as core messages.
fn spawn_event_loop(
    input_tx: mpsc::Sender<Input>,
    api_events: mpsc::Receiver<ApiEvent>,
    poll_events: mpsc::Receiver<PollEvent>,
) {
    thread::spawn(move || loop {
        let mut idle = true;
        match api_events.try_recv() {
            Ok(event) => {
                idle = false;
                if let Some(msg) = api_event_msg(event) {
                    if input_tx.send(Input::Msg(msg)).is_err() {
                        return;
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => return,
        }
        match poll_events.try_recv() {
            Ok(event) => {
                idle = false;
                if let Some(msg) = poll_event_msg(event) {
                    if input_tx.send(Input::Msg(msg)).is_err() {
                        return;
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => return,
        }
        if idle {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn api_event_msg(event: ApiEvent) -> Option<Msg> {
    match event {
        ApiEvent::Results { force, result } => match result {
            Ok(values) => {
                board_info!(
                    "fetched {} results (force={})",
                    values.len(),
                    force
                );
                Some(Msg::ResultsLoaded(map_records(values)))
            }
            Err(err) => Some(Msg::ResultsFailed(err.to_string())),
        },
        ApiEvent::SingleDone { result } => match result {
            Ok(_) => Some(Msg::SingleScrapeDone),
            Err(err) => Some(Msg::SingleScrapeFailed(err.to_string())),
        },
        ApiEvent::BatchCreated { result } => match result {
            Ok(created) => {
                board_info!(
                    "job {} accepted: {} to scrape, {} already processed, {} duplicates",
                    created.job_id,
                    created.to_scrape.len(),
                    created.already_processed.len(),
                    created.duplicates_in_payload.len()
                );
                Some(Msg::BatchSubmitted {
                    job_id: created.job_id,
                })
            }
            Err(err) => Some(Msg::BatchFailed(err.to_string())),
        },
        ApiEvent::Prepared { result } => match result {
            Ok(prepared) => Some(Msg::PrepareFinished(map_prep(prepared))),
            Err(err) => Some(Msg::PrepareFailed(err.to_string())),
        },
        ApiEvent::KeyPushed { result } => {
            match result {
                Ok(()) => board_info!("extraction API key accepted by server"),
                Err(err) => board_warn!("API key push failed: {err}"),
            }
            None
        }
    }
}

fn poll_event_msg(event: PollEvent) -> Option<Msg> {
    match event.result {
        Ok(status) => Some(Msg::JobStatusArrived {
            job_id: event.job_id,
            seq: event.seq,
            status: map_job_status(status),
        }),
        Err(err) => {
            // Transient poll failures only log; the timer keeps going.
            board_warn!(
                "poll {} for job {} failed: {err}",
                event.seq,
                event.job_id
            );
            None
        }
    }
}

fn map_records(values: Vec<Value>) -> Vec<ResultRecord> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                board_warn!("dropping malformed record: {err}");
                None
            }
        })
        .collect()
}

fn map_job_status(dto: JobStatusDto) -> JobStatus {
    JobStatus {
        job_id: dto.job_id,
        done: dto.done,
        progress_percent: dto.progress_percent.clamp(0, 100) as u8,
        results: map_records(dto.results),
        errors: dto
            .errors
            .into_iter()
            .map(|e| JobFailure {
                url: e.url,
                message: e.message,
            })
            .collect(),
        current_url: dto.current_url,
        current_elapsed_seconds: dto.current_elapsed_seconds,
        total_elapsed_seconds: dto.total_elapsed_seconds,
        total_urls: dto.total_urls,
        completed_urls: dto.completed_urls,
        url_timings: dto
            .url_timings
            .into_iter()
            .map(|t| UrlTiming {
                url: t.url,
                seconds: t.seconds,
            })
            .collect(),
    }
}

fn map_prep(dto: PrepareDto) -> PrepSummary {
    PrepSummary {
        to_scrape: dto.to_scrape,
        already_processed: dto.already_processed,
        duplicates_in_payload: dto.duplicates_in_payload,
        normalized_map: dto.normalized_map,
    }
}

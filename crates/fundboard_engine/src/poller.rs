//! Fixed-interval polling of one batch job. Each request carries a
//! monotonically increasing sequence number so the consumer can discard any
//! response the network delivered out of order.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::client::{ApiClient, RequestError};
use crate::protocol::JobStatusDto;

/// Fixed gap between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Seam for the status fetch so tests can script responses without a server.
#[async_trait::async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &str) -> Result<JobStatusDto, RequestError>;
}

#[async_trait::async_trait]
impl JobStatusSource for ApiClient {
    async fn job_status(&self, job_id: &str) -> Result<JobStatusDto, RequestError> {
        ApiClient::job_status(self, job_id).await
    }
}

/// One poll round-trip. Transient failures ride in `result`; polling itself
/// keeps going until the poller is stopped.
#[derive(Debug)]
pub struct PollEvent {
    pub job_id: String,
    pub seq: u64,
    pub result: Result<JobStatusDto, RequestError>,
}

/// Handle to one job's polling timer. At most one timer exists per job
/// because the owner holds at most one handle; dropping or stopping the
/// handle cancels future polls (an in-flight request still completes, its
/// response is simply never read).
pub struct JobPoller {
    stop_tx: mpsc::Sender<()>,
}

impl JobPoller {
    /// Start polling: one immediate status fetch, then one per `interval`
    /// until stopped or the event receiver goes away.
    pub fn start(
        source: Arc<dyn JobStatusSource>,
        job_id: String,
        interval: Duration,
        event_tx: mpsc::Sender<PollEvent>,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut seq: u64 = 0;
            loop {
                seq += 1;
                let result = runtime.block_on(source.job_status(&job_id));
                let event = PollEvent {
                    job_id: job_id.clone(),
                    seq,
                    result,
                };
                if event_tx.send(event).is_err() {
                    break;
                }
                match stop_rx.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    // Explicit stop, or the handle was dropped.
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self { stop_tx }
    }

    /// Stop scheduling further polls.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
    }
}

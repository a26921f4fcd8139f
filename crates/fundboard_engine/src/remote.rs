//! Command/event bridge to the scrape API: callers stay synchronous and
//! channel-driven while a dedicated thread owns the tokio runtime.

use std::sync::{mpsc, Arc};
use std::thread;

use board_logging::board_warn;
use serde_json::Value;

use crate::client::{ApiClient, RequestError};
use crate::protocol::{BatchCreated, PrepareDto};

#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Fetch the record set. `force` asks the server to rebuild its results
    /// store first.
    FetchResults { force: bool },
    ScrapeSingle { fund_url: String },
    SubmitBatch {
        fund_urls: Vec<String>,
        rescrape_urls: Vec<String>,
    },
    PrepareUrls { fund_urls: Vec<String> },
    PushApiKey { key: String },
}

#[derive(Debug)]
pub enum ApiEvent {
    Results {
        force: bool,
        result: Result<Vec<Value>, RequestError>,
    },
    SingleDone {
        result: Result<Value, RequestError>,
    },
    BatchCreated {
        result: Result<BatchCreated, RequestError>,
    },
    Prepared {
        result: Result<PrepareDto, RequestError>,
    },
    KeyPushed {
        result: Result<(), RequestError>,
    },
}

/// Command side of the bridge. Events come back on the receiver returned by
/// [`ApiHandle::new`], so a platform loop can own event consumption outright.
pub struct ApiHandle {
    cmd_tx: mpsc::Sender<ApiCommand>,
}

impl ApiHandle {
    pub fn new(client: ApiClient) -> (Self, mpsc::Receiver<ApiEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let client = Arc::new(client);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx).await;
                });
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn send(&self, command: ApiCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    client: &ApiClient,
    command: ApiCommand,
    event_tx: mpsc::Sender<ApiEvent>,
) {
    let event = match command {
        ApiCommand::FetchResults { force } => {
            if force {
                // Best effort; a failed server-side rebuild still leaves the
                // plain fetch worth doing.
                if let Err(err) = client.refresh_results().await {
                    board_warn!("server-side results refresh failed: {err}");
                }
            }
            ApiEvent::Results {
                force,
                result: client.results().await,
            }
        }
        ApiCommand::ScrapeSingle { fund_url } => ApiEvent::SingleDone {
            result: client.scrape_single(&fund_url, None).await,
        },
        ApiCommand::SubmitBatch {
            fund_urls,
            rescrape_urls,
        } => ApiEvent::BatchCreated {
            result: client.scrape_batch(&fund_urls, &rescrape_urls).await,
        },
        ApiCommand::PrepareUrls { fund_urls } => ApiEvent::Prepared {
            result: client.prepare(&fund_urls).await,
        },
        ApiCommand::PushApiKey { key } => ApiEvent::KeyPushed {
            result: client.set_openai_key(&key).await,
        },
    };
    let _ = event_tx.send(event);
}

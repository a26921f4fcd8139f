use std::sync::{mpsc, Arc};
use std::time::Duration;

use fundboard_engine::{ApiClient, JobPoller, JobStatusSource, PollEvent, RequestError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_INTERVAL: Duration = Duration::from_millis(25);
const RECV_PATIENCE: Duration = Duration::from_secs(5);

async fn mock_job_server(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scrape/jobs/j-1"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn polls_immediately_and_numbers_requests_monotonically() {
    let server = mock_job_server(200, json!({ "job_id": "j-1", "done": false })).await;
    let source: Arc<dyn JobStatusSource> =
        Arc::new(ApiClient::new(&server.uri()).expect("client"));
    let (event_tx, event_rx) = mpsc::channel::<PollEvent>();

    let poller = JobPoller::start(source, "j-1".into(), TEST_INTERVAL, event_tx);

    let mut seqs = Vec::new();
    for _ in 0..3 {
        let event = event_rx.recv_timeout(RECV_PATIENCE).expect("poll event");
        assert_eq!(event.job_id, "j-1");
        let status = event.result.expect("status");
        assert!(!status.done);
        seqs.push(event.seq);
    }
    poller.stop();

    assert_eq!(seqs, vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn polling_survives_transient_http_failures() {
    let server = mock_job_server(500, json!({})).await;
    let source: Arc<dyn JobStatusSource> =
        Arc::new(ApiClient::new(&server.uri()).expect("client"));
    let (event_tx, event_rx) = mpsc::channel::<PollEvent>();

    let poller = JobPoller::start(source, "j-1".into(), TEST_INTERVAL, event_tx);

    // Two consecutive failures arrive; the poller never gives up on its own.
    for expected_seq in 1..=2 {
        let event = event_rx.recv_timeout(RECV_PATIENCE).expect("poll event");
        assert_eq!(event.seq, expected_seq);
        match event.result {
            Err(RequestError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }
    poller.stop();
}

#[tokio::test(flavor = "multi_thread")]
async fn stopping_cancels_future_polls() {
    let server = mock_job_server(200, json!({ "job_id": "j-1", "done": false })).await;
    let source: Arc<dyn JobStatusSource> =
        Arc::new(ApiClient::new(&server.uri()).expect("client"));
    let (event_tx, event_rx) = mpsc::channel::<PollEvent>();

    let poller = JobPoller::start(source, "j-1".into(), TEST_INTERVAL, event_tx);
    let first = event_rx.recv_timeout(RECV_PATIENCE).expect("first poll");
    assert_eq!(first.seq, 1);
    poller.stop();

    // Drain anything already in flight, then expect silence.
    let mut last_seen = first.seq;
    while let Ok(event) = event_rx.recv_timeout(TEST_INTERVAL * 4) {
        assert!(event.seq > last_seen);
        last_seen = event.seq;
    }
    assert!(
        event_rx.recv_timeout(TEST_INTERVAL * 4).is_err(),
        "poller kept emitting after stop"
    );
}

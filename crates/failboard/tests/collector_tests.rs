//! Collector client tests against a canned local HTTP server.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;

use common::CannedCollector;
use failboard::broadcast::{NotificationKind, Notifier};
use failboard::collector::{ClientOptions, RetryPolicy};
use failboard::{poll_once, CollectorClient, DashboardState, JobSource, JobStatus, PollError, SnapshotPolicy};

const TWO_JOBS: &str = r#"[
    {"id": "1", "name": "ETL_Daily", "application": "Finance", "status": "failed",
     "orderDate": "2024-03-01T06:00:00Z", "errorMessage": "exit code 12"},
    {"id": "2", "name": "Backup_Weekly", "status": "failed"}
]"#;

fn fast_options(max_attempts: u32) -> ClientOptions {
    ClientOptions {
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(20),
        },
    }
}

fn client(endpoint: &str, max_attempts: u32) -> CollectorClient {
    CollectorClient::new(
        endpoint,
        SecretString::from("test-key".to_string()),
        fast_options(max_attempts),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_decodes_jobs_and_sends_bearer_key() {
    let server = CannedCollector::start(vec![(200, TWO_JOBS.to_string())]).await;

    let jobs = client(&server.endpoint, 1).fetch_failed_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].name.as_deref(), Some("ETL_Daily"));
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert!(jobs[0].order_date.is_some());
    assert!(!jobs[1].is_fixed);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /jobs/failed "));
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("authorization: bearer test-key"));
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = CannedCollector::start(vec![
        (401, r#"{"message": "bad key"}"#.to_string()),
        (200, TWO_JOBS.to_string()),
    ])
    .await;

    let err = client(&server.endpoint, 3)
        .fetch_failed_jobs()
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Status { status: 401, .. }));
    assert!(err.to_string().contains("bad key"));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = CannedCollector::start(vec![
        (503, "maintenance".to_string()),
        (200, TWO_JOBS.to_string()),
    ])
    .await;

    let jobs = client(&server.endpoint, 3).fetch_failed_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = CannedCollector::start(vec![
        (500, "boom".to_string()),
        (500, "boom".to_string()),
    ])
    .await;

    let err = client(&server.endpoint, 2)
        .fetch_failed_jobs()
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Status { status: 500, .. }));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = CannedCollector::start(vec![(200, r#"{"jobs": "nope"}"#.to_string())]).await;

    let err = client(&server.endpoint, 3)
        .fetch_failed_jobs()
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Decode(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_poll_once_against_collector() {
    let server = CannedCollector::start(vec![
        (200, TWO_JOBS.to_string()),
        (401, "denied".to_string()),
    ])
    .await;
    let source = client(&server.endpoint, 1);

    let notifier = Notifier::new(16);
    let mut rx = notifier.subscribe();
    let state = Arc::new(Mutex::new(DashboardState::new(
        "ana",
        SnapshotPolicy::Overwrite,
        notifier,
    )));

    let report = poll_once(&source, &state).await.unwrap();
    assert_eq!(report.jobs, 2);
    // First snapshot seeds silently
    assert!(report.new_failed.is_empty());

    assert!(poll_once(&source, &state).await.is_err());
    assert_eq!(state.lock().unwrap().repository().len(), 2);

    let notification = rx.try_recv().unwrap();
    assert_eq!(notification.kind, NotificationKind::PollError);
}

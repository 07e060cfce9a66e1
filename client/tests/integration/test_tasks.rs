//! Controller tests over real HTTP

use std::time::Duration;

use serde_json::json;

use devtask::tasks::{ListQuery, NoopObserver, WaitOptions, WaitState};
use devtask::{DeviceApiClient, ErrorKind, TaskPriority, TaskStatus};

use crate::common::{MockResponse, MockServer};

fn fast_wait() -> WaitOptions {
    WaitOptions {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_create_task_round_trip() {
    let server = MockServer::start(vec![MockResponse::ok(json!({"task_id": 7}))]).await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let created = client.create_task("a|b", TaskPriority::High).await.unwrap();
    assert_eq!(created.task_id, 7);
    assert!(created.details.is_empty());

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/device/create.php");
    assert_eq!(requests[0].body, Some(json!({"account_info": "a|b", "priority": 2})));
}

#[tokio::test]
async fn test_wrapped_priority_is_normalized() {
    let server = MockServer::start(vec![MockResponse::ok(json!({"task_id": 8}))]).await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    client.create_task("a|b", json!({"value": 3})).await.unwrap();

    assert_eq!(server.requests()[0].body.as_ref().unwrap()["priority"], json!(3));
}

#[tokio::test]
async fn test_get_task_server_error() {
    let server = MockServer::start(vec![MockResponse::json(
        500,
        json!({"success": false, "message": "db down", "error_code": "DB_ERROR"}),
    )])
    .await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let err = client.get_task(1).await.unwrap_err();
    assert_eq!(err.code(), "DB_ERROR");
    assert_eq!(err.message, "db down");
    assert_eq!(err.status_code, Some(500));
}

#[tokio::test]
async fn test_list_sends_clamped_bounds() {
    let server = MockServer::start(vec![MockResponse::ok(json!({
        "tasks": [{"id": 1, "status": "pending", "status_code": 0, "queue_position": 1}],
        "pagination": {"total": 1, "limit": 100, "offset": 0, "has_more": false},
        "stats": {"pending": 1}
    }))])
    .await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let page = client
        .list_tasks(&ListQuery {
            limit: 500,
            offset: -10,
            ..ListQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.tasks.len(), 1);
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.stats["pending"], 1);

    let query = &server.requests()[0].query;
    assert_eq!(query.get("limit").map(String::as_str), Some("100"));
    assert_eq!(query.get("offset").map(String::as_str), Some("0"));
    assert_eq!(query.get("status").map(String::as_str), Some("all"));
}

#[tokio::test]
async fn test_await_completion_survives_flaky_check() {
    let server = MockServer::start(vec![
        MockResponse::ok(json!({"id": 3, "status_code": 0, "queue_position": 2})),
        MockResponse::raw(502, "Bad Gateway"),
        MockResponse::ok(json!({"id": 3, "status_code": 1, "server_id": "srv-1"})),
        MockResponse::ok(json!({
            "id": 3,
            "status_code": 2,
            "device_info": {"name": "Pixel 7", "country": "US"}
        })),
    ])
    .await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let outcome = client.await_completion(3, &fast_wait(), &NoopObserver).await;

    assert!(outcome.is_success());
    let task = outcome.task().unwrap();
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.device_info().and_then(|d| d.country.as_deref()), Some("US"));
    assert_eq!(server.requests().len(), 4);
}

#[tokio::test]
async fn test_await_completion_reports_failure() {
    let server = MockServer::start(vec![MockResponse::ok(json!({
        "id": 4,
        "status_code": 3,
        "error_message": "Invalid account credentials",
        "can_retry": true
    }))])
    .await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let outcome = client.await_completion(4, &fast_wait(), &NoopObserver).await;

    assert_eq!(outcome.state(), WaitState::Failed);
    assert_eq!(outcome.error().as_deref(), Some("Invalid account credentials"));
    assert!(outcome.task().unwrap().can_retry());
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_create_and_wait_stops_on_creation_error() {
    let server = MockServer::start(vec![MockResponse::json(
        429,
        json!({"success": false, "message": "Too many pending tasks", "error_code": "LIMIT_REACHED"}),
    )])
    .await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();

    let err = client
        .create_and_wait("a|b", TaskPriority::Urgent, &fast_wait(), &NoopObserver)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server("LIMIT_REACHED".to_string()));
    assert_eq!(err.status_code, Some(429));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_await_completion_times_out() {
    let server = MockServer::start(vec![MockResponse::ok(json!({"id": 5, "status_code": 1}))]).await;
    let client = DeviceApiClient::connect(&server.options()).unwrap();
    let options = WaitOptions {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(50),
    };

    let started = std::time::Instant::now();
    let outcome = client.await_completion(5, &options, &NoopObserver).await;

    assert_eq!(outcome.state(), WaitState::TimedOut);
    assert!(started.elapsed() >= options.timeout);
    assert!(server.requests().len() >= 2);
}

//! Transport tests over real HTTP

use std::time::Duration;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use devtask::http::{ApiRequest, HttpClient, Transport};
use devtask::{ClientOptions, ErrorKind};

use crate::common::{closed_base_url, MockResponse, MockServer, TOKEN};

#[tokio::test]
async fn test_success_returns_data_and_sends_token() {
    let server = MockServer::start(vec![MockResponse::ok(json!({"id": 1}))]).await;
    let client = HttpClient::new(&server.options()).unwrap();

    let data = assert_ok!(client.request(&ApiRequest::get("get.php").with_query("task_id", 1)).await);
    assert_eq!(data, json!({"id": 1}));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/device/get.php");
    assert_eq!(requests[0].query.get("task_id").map(String::as_str), Some("1"));
    assert_eq!(requests[0].token.as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start(vec![MockResponse::ok(json!({}))]).await;
    let client = HttpClient::new(&server.options()).unwrap();

    let request = ApiRequest::post("cancel.php", &json!({"task_id": 9})).unwrap();
    assert_ok!(client.request(&request).await);

    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].body, Some(json!({"task_id": 9})));
}

#[tokio::test]
async fn test_server_error_envelope() {
    let server = MockServer::start(vec![MockResponse::json(
        500,
        json!({"success": false, "message": "db down", "error_code": "DB_ERROR"}),
    )])
    .await;
    let client = HttpClient::new(&server.options()).unwrap();

    let err = assert_err!(client.request(&ApiRequest::get("get.php")).await);
    assert_eq!(err.kind, ErrorKind::Server("DB_ERROR".to_string()));
    assert_eq!(err.message, "db down");
    assert_eq!(err.status_code, Some(500));
}

#[tokio::test]
async fn test_rejection_with_ok_status() {
    let server = MockServer::start(vec![MockResponse::json(
        200,
        json!({"success": false, "message": "Task cannot be cancelled"}),
    )])
    .await;
    let client = HttpClient::new(&server.options()).unwrap();

    let err = assert_err!(client.request(&ApiRequest::get("cancel.php")).await);
    assert_eq!(err.kind, ErrorKind::RequestError);
    assert_eq!(err.message, "Task cannot be cancelled");
    assert_eq!(err.status_code, Some(200));
}

#[tokio::test]
async fn test_non_json_body() {
    let body = format!("<html><body>{}</body></html>", "Bad Gateway ".repeat(50));
    let server = MockServer::start(vec![MockResponse::raw(200, body)]).await;
    let client = HttpClient::new(&server.options()).unwrap();

    let err = assert_err!(client.request(&ApiRequest::get("stats.php")).await);
    assert_eq!(err.kind, ErrorKind::InvalidJson);
    assert_eq!(err.status_code, Some(200));
    let snippet = err.message.trim_start_matches("Invalid JSON response: ");
    assert!(snippet.starts_with("<html>"));
    assert!(snippet.chars().count() <= 200);
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start(vec![
        MockResponse::ok(json!({})).delayed(Duration::from_secs(5)),
    ])
    .await;
    let options = server.options().with_timeout(Duration::from_millis(200));
    let client = HttpClient::new(&options).unwrap();

    let err = assert_err!(client.request(&ApiRequest::get("get.php")).await);
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(err.status_code, None);
}

#[tokio::test]
async fn test_connection_refused() {
    let options = ClientOptions::new(closed_base_url().await, TOKEN);
    let client = HttpClient::new(&options).unwrap();

    let err = assert_err!(client.request(&ApiRequest::get("get.php")).await);
    assert_eq!(err.kind, ErrorKind::ConnectionError);
    assert_eq!(err.message, "Connection error - unable to reach API server");
    assert!(err.is_transient());
}

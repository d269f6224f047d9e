//! `/healthz` endpoint tests with injected checks.

use std::sync::Arc;
use std::time::Duration;

use network_health::config::HealthTimeout;
use network_health::HealthChecker;
use reqwest::StatusCode;

use crate::helpers::*;

#[tokio::test]
async fn test_healthz_returns_json_array() {
    let server = TestServer::start(HealthChecker::new()).await;
    let resp = server.get("/healthz").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!([]));

    server.shutdown().await;
}

#[tokio::test]
async fn test_stuck_check_is_cancelled_at_deadline() {
    let checker = HealthChecker::new().with_check(Arc::new(StuckCheck));
    let server = TestServer::start_with_timeout(
        checker,
        HealthTimeout(Some(Duration::from_millis(100))),
    )
    .await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["name"], "stuck");
    assert_eq!(outcomes[0]["failed"], true);
    assert_eq!(outcomes[0]["message"], "stuck check was cancelled.");

    server.shutdown().await;
}

#[tokio::test]
async fn test_panicking_check_does_not_take_down_server() {
    let checker = HealthChecker::new().with_check(Arc::new(PanickingCheck));
    let server = TestServer::start(checker).await;

    let first = server.healthz().await;
    assert_eq!(first[0]["failed"], true);
    assert!(first[0]["message"].as_str().unwrap().contains("boom"));

    // Server still answers after the panic
    let second = server.healthz().await;
    assert_eq!(first, second);

    server.shutdown().await;
}

#[tokio::test]
async fn test_post_is_rejected() {
    let server = TestServer::start(HealthChecker::new()).await;

    let resp = server.post("/healthz").await;
    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = TestServer::start(HealthChecker::new()).await;

    let resp = server.get("/healthz/extra").await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), "Not Found");

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = TestServer::start(HealthChecker::new()).await;
    let base_url = server.base_url.clone();
    let client = server.client.clone();

    server.shutdown().await;

    let result = client
        .get(format!("{}/healthz", base_url))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err(), "listener should be closed after shutdown");
}

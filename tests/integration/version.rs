//! `/version` endpoint tests.

use network_health::{HealthChecker, BUILD_VERSION, PKG_VERSION};
use reqwest::StatusCode;

use crate::helpers::*;

#[tokio::test]
async fn test_version_fields() {
    let server = TestServer::start(HealthChecker::new()).await;
    let resp = server.get("/version").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "network-health-test");
    assert_eq!(body["version"], PKG_VERSION);
    assert_eq!(body["git_commit"], BUILD_VERSION);
    for key in ["description", "os_arch", "source"] {
        assert!(body[key].is_string(), "missing '{}' in {}", key, body);
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_version_rejects_delete() {
    let server = TestServer::start(HealthChecker::new()).await;

    let resp = server
        .client
        .delete(format!("{}/version", server.base_url))
        .send()
        .await
        .unwrap();
    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);

    server.shutdown().await;
}

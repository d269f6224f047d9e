//! KVM mode end to end with fake probers.

use std::net::Ipv4Addr;
use std::sync::Arc;

use network_health::config::HealthMode;
use network_health::HealthChecker;

use crate::helpers::*;

const GUEST: Ipv4Addr = Ipv4Addr::new(10, 1, 2, 3);
const SERVICE_URL: &str = "http://10.1.2.3:10248/healthz";
const API_URL: &str = "https://10.1.2.3:443/healthz";

fn checker(check_api: bool, echo: Arc<FakeEcho>, http: Arc<FakeHttp>) -> HealthChecker {
    HealthChecker::from_mode(
        &HealthMode::Kvm {
            guest_ip: GUEST,
            check_api,
        },
        Arc::new(StaticTable(Vec::new())),
        echo,
        http,
    )
    .unwrap()
}

#[tokio::test]
async fn test_responsive_guest() {
    let http = FakeHttp::new(&[]);
    let server = TestServer::start(checker(true, FakeEcho::new(true), http.clone())).await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["name"], "kvmHealthz");
    assert_eq!(
        outcomes[0]["description"],
        "Ensure KVM is responding to the assigned ip."
    );
    assert_eq!(outcomes[0]["failed"], false);
    assert_eq!(
        outcomes[0]["message"],
        format!("Healthcheck for http endpoint {} has been successful.", API_URL)
    );
    assert_eq!(http.requested(), vec![SERVICE_URL, API_URL]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_silent_guest_skips_http() {
    let echo = FakeEcho::new(false);
    let http = FakeHttp::new(&[]);
    let server = TestServer::start(checker(true, echo.clone(), http.clone())).await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes[0]["failed"], true);
    assert_eq!(
        outcomes[0]["message"],
        "Healthcheck for KVM has failed. KVM is not responding on 10.1.2.3."
    );
    assert_eq!(echo.calls(), 1);
    assert!(http.requested().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_each_request_probes_again() {
    let echo = FakeEcho::new(true);
    let http = FakeHttp::new(&[SERVICE_URL]);
    let server = TestServer::start(checker(false, echo.clone(), http.clone())).await;

    let first = server.healthz().await;
    let second = server.healthz().await;

    assert_eq!(first, second);
    assert_eq!(first[0]["failed"], true);
    assert_eq!(echo.calls(), 2);
    assert_eq!(http.requested(), vec![SERVICE_URL, SERVICE_URL]);

    server.shutdown().await;
}

//! Test helpers and utilities

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use network_health::config::HealthTimeout;
use network_health::health::{HealthCheck, HealthChecker};
use network_health::probe::{EchoError, EchoProber, HttpProber, InterfaceTable, Step};
use network_health::Server;
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use reqwest::{Client, Response, StatusCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// In-process server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start(checker: HealthChecker) -> Self {
        Self::start_with_timeout(checker, HealthTimeout::default()).await
    }

    pub async fn start_with_timeout(checker: HealthChecker, timeout: HealthTimeout) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().unwrap();

        let server = Arc::new(Server::new(checker, timeout, "network-health-test").without_access_log());
        let serving = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            serving.serve(listener).await.expect("Server failed");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            server,
            handle: Some(handle),
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a POST request with an empty body
    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET `/healthz` and decode the outcome array.
    pub async fn healthz(&self) -> Vec<serde_json::Value> {
        let resp = self.get("/healthz").await;
        assert_status(&resp, StatusCode::OK);
        resp.json().await.expect("healthz body is not a JSON array")
    }

    /// Trigger shutdown and wait for the accept loop to exit.
    pub async fn shutdown(mut self) {
        self.server.trigger_shutdown();
        if let Some(handle) = self.handle.take() {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .expect("Server did not stop")
                .expect("Server task panicked");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

// =============================================================================
// Fake network
// =============================================================================

/// Interface table with a fixed set of interfaces.
pub struct StaticTable(pub Vec<NetworkInterface>);

impl InterfaceTable for StaticTable {
    fn interfaces(&self) -> Vec<NetworkInterface> {
        self.0.clone()
    }
}

pub fn interface(name: &str, addrs: &[(&str, u8)]) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        description: String::new(),
        index: 0,
        mac: None,
        ips: addrs
            .iter()
            .map(|(ip, prefix)| {
                IpNetwork::V4(Ipv4Network::new(ip.parse().unwrap(), *prefix).unwrap())
            })
            .collect(),
        flags: 1,
    }
}

/// Echo prober with a fixed answer that counts calls.
pub struct FakeEcho {
    pub reachable: bool,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeEcho {
    pub fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EchoProber for FakeEcho {
    async fn echo(&self, _target: Ipv4Addr, _timeout: Duration) -> Result<bool, EchoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reachable)
    }
}

/// HTTP prober that answers 200 except for the listed URLs.
pub struct FakeHttp {
    failing: Vec<String>,
    requested: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeHttp {
    pub fn new(failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpProber for FakeHttp {
    async fn get(&self, url: &str) -> Result<u16, String> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.iter().any(|f| f == url) {
            Err("connection refused".to_string())
        } else {
            Ok(200)
        }
    }
}

/// Check that waits until cancelled.
pub struct StuckCheck;

#[async_trait]
impl HealthCheck for StuckCheck {
    fn name(&self) -> &str {
        "stuck"
    }

    fn description(&self) -> &str {
        "Never answers on its own."
    }

    async fn check(&self, cancel: &CancellationToken) -> Step {
        cancel.cancelled().await;
        Step::Fail("stuck check was cancelled.".to_string())
    }
}

/// Check that panics.
pub struct PanickingCheck;

#[async_trait]
impl HealthCheck for PanickingCheck {
    fn name(&self) -> &str {
        "panicking"
    }

    fn description(&self) -> &str {
        "Always panics."
    }

    async fn check(&self, _cancel: &CancellationToken) -> Step {
        panic!("boom");
    }
}

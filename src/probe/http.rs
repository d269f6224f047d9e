//! HTTP/HTTPS endpoint probe.
//!
//! Any response counts as reachable, whatever its status code. The client
//! keeps no idle connections, so a connection is never reused between two
//! health-check runs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONNECTION};
use reqwest::Client;
use tracing::debug;

/// Upper bound for a single HTTP probe, connect included.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(4);

/// Issues one GET request.
#[async_trait]
pub trait HttpProber: Send + Sync {
    /// `Ok(status)` when any response was received, `Err(reason)` on
    /// transport failure (refused, timeout, TLS, ...).
    async fn get(&self, url: &str) -> Result<u16, String>;
}

/// reqwest-backed prober with certificate verification disabled.
///
/// The probed addresses are cluster-internal and typically serve
/// self-signed certificates; the probe only asks "does it answer".
pub struct HttpEndpointProber {
    client: Client,
}

impl HttpEndpointProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProber for HttpEndpointProber {
    async fn get(&self, url: &str) -> Result<u16, String> {
        let response = self
            .client
            .get(url)
            .header(CONNECTION, HeaderValue::from_static("close"))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        debug!(url, status, "HTTP probe answered");
        Ok(status)
    }
}

//! Guest reachability chain: echo, then service port, then API.
//!
//! The steps run strictly in order and the chain stops at the first failure.
//! Each executed step's message replaces the previous one, so the caller
//! sees the diagnostic of the last step attempted.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{EchoProber, HttpProber, Step, ECHO_TIMEOUT};

/// Node agent health port, probed over plain HTTP.
pub const SERVICE_PORT: u16 = 10248;
/// Kubernetes API port, probed over HTTPS.
pub const API_PORT: u16 = 443;

/// One link of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    Echo,
    ServicePort,
    Api,
}

/// Reachability probe for a single guest address.
pub struct ReachabilityProbe {
    ip: Ipv4Addr,
    check_api: bool,
    echo: Arc<dyn EchoProber>,
    http: Arc<dyn HttpProber>,
}

impl ReachabilityProbe {
    pub fn new(
        ip: Ipv4Addr,
        check_api: bool,
        echo: Arc<dyn EchoProber>,
        http: Arc<dyn HttpProber>,
    ) -> Self {
        Self {
            ip,
            check_api,
            echo,
            http,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// Steps this probe runs, in order.
    pub fn steps(&self) -> Vec<ChainStep> {
        let mut steps = vec![ChainStep::Echo, ChainStep::ServicePort];
        if self.check_api {
            steps.push(ChainStep::Api);
        }
        steps
    }

    /// Run the chain until a step fails or all steps passed.
    ///
    /// If `cancel` fires while a step is in flight, the step is abandoned and
    /// reported as failed.
    pub async fn run(&self, cancel: &CancellationToken) -> Step {
        let mut last = Step::Fail(format!("No reachability checks configured for {}.", self.ip));

        for step in self.steps() {
            last = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Fail(format!(
                    "Healthcheck for {} was cancelled during {:?} check.",
                    self.ip, step
                )),
                result = self.execute(step) => result,
            };

            debug!(ip = %self.ip, ?step, failed = last.is_fail(), "Reachability step finished");

            if last.is_fail() {
                break;
            }
        }

        last
    }

    async fn execute(&self, step: ChainStep) -> Step {
        match step {
            ChainStep::Echo => self.echo_check().await,
            ChainStep::ServicePort => self.http_check("http", SERVICE_PORT).await,
            ChainStep::Api => self.http_check("https", API_PORT).await,
        }
    }

    async fn echo_check(&self) -> Step {
        match self.echo.echo(self.ip, ECHO_TIMEOUT).await {
            Ok(true) => Step::Pass(format!(
                "Healthcheck for KVM has been successful. KVM is live and responding on {}.",
                self.ip
            )),
            Ok(false) => Step::Fail(format!(
                "Healthcheck for KVM has failed. KVM is not responding on {}.",
                self.ip
            )),
            Err(e) => Step::Fail(format!("Failed to init pinger for {}. {}", self.ip, e)),
        }
    }

    async fn http_check(&self, scheme: &str, port: u16) -> Step {
        let url = endpoint_url(scheme, self.ip, port);

        match self.http.get(&url).await {
            Ok(_status) => Step::Pass(format!(
                "Healthcheck for http endpoint {} has been successful.",
                url
            )),
            Err(e) => Step::Fail(format!(
                "Failed to send http request to endpoint {}. {}",
                url, e
            )),
        }
    }
}

fn endpoint_url(scheme: &str, ip: Ipv4Addr, port: u16) -> String {
    format!("{}://{}:{}/healthz", scheme, ip, port)
}

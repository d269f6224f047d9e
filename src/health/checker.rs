//! Health check aggregation.

use std::any::Any;
use std::net::Ipv4Addr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::{
    AggregatedVerdict, HealthCheck, InterfaceCheck, NetworkTarget, ProbeOutcome,
    ReachabilityCheck,
};
use crate::config::HealthMode;
use crate::error::Error;
use crate::flannel;
use crate::probe::{EchoProber, HttpProber, InterfaceTable, ReachabilityProbe};

/// Runs a fixed list of health checks.
///
/// The list is built once at startup and only read afterwards, so one
/// checker can serve any number of concurrent requests.
#[derive(Clone, Default)]
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check. Checks run in registration order.
    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// One interface check per target, in the given order.
    pub fn for_interfaces(targets: Vec<NetworkTarget>, table: Arc<dyn InterfaceTable>) -> Self {
        targets.into_iter().fold(Self::new(), |checker, target| {
            checker.with_check(Arc::new(InterfaceCheck::new(target, Arc::clone(&table))))
        })
    }

    /// A single reachability check for the guest at `ip`.
    pub fn for_guest(
        ip: Ipv4Addr,
        check_api: bool,
        echo: Arc<dyn EchoProber>,
        http: Arc<dyn HttpProber>,
    ) -> Self {
        let probe = ReachabilityProbe::new(ip, check_api, echo, http);
        Self::new().with_check(Arc::new(ReachabilityCheck::new(probe)))
    }

    /// Build the checks for the configured mode.
    ///
    /// In flannel mode this reads the env file once; a missing or unusable
    /// file is a startup error.
    pub fn from_mode(
        mode: &HealthMode,
        table: Arc<dyn InterfaceTable>,
        echo: Arc<dyn EchoProber>,
        http: Arc<dyn HttpProber>,
    ) -> Result<Self, Error> {
        match mode {
            HealthMode::Flannel {
                bridge_interface,
                flannel_interface,
                env_file,
            } => {
                let addresses = flannel::load_addresses(env_file)?;
                debug!(
                    overlay_ip = %addresses.overlay_ip,
                    bridge_ip = %addresses.bridge_ip,
                    "Flannel addresses derived"
                );

                let targets = vec![
                    NetworkTarget::new(bridge_interface.as_str(), addresses.bridge_ip)?,
                    NetworkTarget::new(flannel_interface.as_str(), addresses.overlay_ip)?,
                ];
                Ok(Self::for_interfaces(targets, table))
            }
            HealthMode::Kvm {
                guest_ip,
                check_api,
            } => Ok(Self::for_guest(*guest_ip, *check_api, echo, http)),
        }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Names of the registered checks, in order.
    pub fn names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check once and collect the outcomes.
    ///
    /// Checks run one after another. A panicking check is reported as a
    /// failed outcome and the remaining checks still run.
    pub async fn run_all(&self, cancel: &CancellationToken) -> AggregatedVerdict {
        let mut outcomes = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let outcome = match AssertUnwindSafe(check.get_health(cancel))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(check = check.name(), reason = %reason, "Health check panicked");
                    ProbeOutcome::new(
                        check.name(),
                        check.description(),
                        true,
                        format!("Healthcheck {} panicked: {}", check.name(), reason),
                    )
                }
            };

            if outcome.failed {
                warn!(check = %outcome.name, message = %outcome.message, "Health check failed");
            } else {
                debug!(check = %outcome.name, "Health check passed");
            }

            outcomes.push(outcome);
        }

        AggregatedVerdict::from_outcomes(outcomes)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Guest reachability health check.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::HealthCheck;
use crate::probe::{ReachabilityProbe, Step};

/// Describes which functionality this health check implements.
pub const KVM_DESCRIPTION: &str = "Ensure KVM is responding to the assigned ip.";
/// Identifier of the health check.
pub const KVM_NAME: &str = "kvmHealthz";

/// Runs the echo / service port / API chain against the guest address.
pub struct ReachabilityCheck {
    probe: ReachabilityProbe,
}

impl ReachabilityCheck {
    pub fn new(probe: ReachabilityProbe) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl HealthCheck for ReachabilityCheck {
    fn name(&self) -> &str {
        KVM_NAME
    }

    fn description(&self) -> &str {
        KVM_DESCRIPTION
    }

    async fn check(&self, cancel: &CancellationToken) -> Step {
        self.probe.run(cancel).await
    }
}

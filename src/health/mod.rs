//! Network health checks served on `/healthz`.
//!
//! Every check is a [`HealthCheck`] with a stable name and description.
//! The [`HealthChecker`] runs them all, in registration order, and collapses
//! their outcomes into an [`AggregatedVerdict`].
//!
//! | Mode      | Checks                                                   |
//! |-----------|----------------------------------------------------------|
//! | `flannel` | `interfaceHealthz <bridge>`, `interfaceHealthz <flannel>` |
//! | `kvm`     | `kvmHealthz`                                             |

mod checker;
mod interface;
mod kvm;
mod status;
mod target;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::probe::Step;

pub use checker::HealthChecker;
pub use interface::{InterfaceCheck, INTERFACE_DESCRIPTION, INTERFACE_NAME};
pub use kvm::{ReachabilityCheck, KVM_DESCRIPTION, KVM_NAME};
pub use status::{AggregatedVerdict, ProbeOutcome};
pub use target::NetworkTarget;

/// A single named health check.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Evaluate the check once. Never errors: every problem is a failed step.
    async fn check(&self, cancel: &CancellationToken) -> Step;

    /// Evaluate and wrap the result with this check's identity.
    async fn get_health(&self, cancel: &CancellationToken) -> ProbeOutcome {
        let (failed, message) = self.check(cancel).await.into_parts();
        ProbeOutcome::new(self.name(), self.description(), failed, message)
    }
}

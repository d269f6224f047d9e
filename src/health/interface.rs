//! Interface health check.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{HealthCheck, NetworkTarget};
use crate::probe::{check_interface, InterfaceTable, Step};

/// Describes which functionality this health check implements.
pub const INTERFACE_DESCRIPTION: &str =
    "Ensure network interface is present and has proper network configuration.";
/// Prefix of the check name; the interface name is appended.
pub const INTERFACE_NAME: &str = "interfaceHealthz";

/// Checks one [`NetworkTarget`] against the host interface table.
pub struct InterfaceCheck {
    target: NetworkTarget,
    name: String,
    table: Arc<dyn InterfaceTable>,
}

impl InterfaceCheck {
    pub fn new(target: NetworkTarget, table: Arc<dyn InterfaceTable>) -> Self {
        let name = format!("{} {}", INTERFACE_NAME, target.name());
        Self {
            target,
            name,
            table,
        }
    }

    pub fn target(&self) -> &NetworkTarget {
        &self.target
    }
}

#[async_trait]
impl HealthCheck for InterfaceCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        INTERFACE_DESCRIPTION
    }

    async fn check(&self, cancel: &CancellationToken) -> Step {
        if cancel.is_cancelled() {
            return Step::Fail(format!(
                "Healthcheck for interface {} was cancelled.",
                self.target.name()
            ));
        }
        // Netlink lookups answer immediately; no timeout needed
        check_interface(
            self.table.as_ref(),
            self.target.name(),
            self.target.expected_address(),
        )
    }
}

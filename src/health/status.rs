//! Health outcome types serialized by `/healthz`.

use serde::Serialize;

/// Result of one named health check, as reported to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// What the check verifies.
    pub description: String,
    /// True when the check evaluated unhealthy or could not be evaluated.
    pub failed: bool,
    /// Diagnostic text of the last step the check executed.
    pub message: String,
    /// Check identifier, e.g. "interfaceHealthz flannel.1".
    pub name: String,
}

impl ProbeOutcome {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        failed: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            failed,
            message: message.into(),
            name: name.into(),
        }
    }
}

/// All outcomes of one run plus the collapsed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedVerdict {
    /// Outcomes in registration order.
    pub outcomes: Vec<ProbeOutcome>,
    /// True if any outcome failed.
    pub failed: bool,
    /// First failing message, or the last message when everything passed.
    pub message: String,
}

impl AggregatedVerdict {
    pub fn from_outcomes(outcomes: Vec<ProbeOutcome>) -> Self {
        let (failed, message) = match outcomes.iter().find(|o| o.failed) {
            Some(first_failure) => (true, first_failure.message.clone()),
            None => (
                outcomes.is_empty(),
                outcomes
                    .last()
                    .map(|o| o.message.clone())
                    .unwrap_or_else(|| "No health checks configured.".to_string()),
            ),
        };

        Self {
            outcomes,
            failed,
            message,
        }
    }

    /// Returns true if no check failed.
    pub fn is_healthy(&self) -> bool {
        !self.failed
    }
}

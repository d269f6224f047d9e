//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use super::parse::Env;
use super::ConfigError;

/// Deadline for one `/healthz` evaluation.
#[derive(Clone, Debug)]
pub struct HealthTimeout(pub Option<Duration>);

impl HealthTimeout {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        self.0
    }
}

impl Default for HealthTimeout {
    fn default() -> Self {
        Self(Some(Duration::from_secs(10)))
    }
}

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address of the health endpoint (LISTEN_ADDRESS, required).
    pub listen_addr: SocketAddr,
    /// Per-request deadline for running all checks.
    pub health_timeout: HealthTimeout,
}

impl ServerConfig {
    pub(crate) fn load<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = env.parse_required("LISTEN_ADDRESS")?;
        let health_timeout = HealthTimeout(env.duration("HEALTH_TIMEOUT", "10s")?);

        Ok(Self {
            listen_addr,
            health_timeout,
        })
    }
}

//! Configuration module for network_health.
//!
//! This module provides centralized configuration loading from environment variables.
//! The resulting [`Config`] is built once at startup and handed to the server;
//! nothing reads the environment while requests are being served.
//!
//! # Example
//!
//! ```rust,ignore
//! use network_health::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! ```

mod error;
mod logging;
mod network;
mod parse;
mod server;

pub use error::ConfigError;
pub use logging::{LoggingConfig, DEFAULT_SERVICE_NAME};
pub use network::HealthMode;
pub use parse::{parse_duration, Env};
pub use server::{HealthTimeout, ServerConfig};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// What to check.
    pub mode: HealthMode,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&Env::process())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn load<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server: ServerConfig::load(env)?,
            mode: HealthMode::load(env)?,
            logging: LoggingConfig::load(env)?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Mode: {}", self.mode.name());

        match &self.mode {
            HealthMode::Flannel {
                bridge_interface,
                flannel_interface,
                env_file,
            } => {
                info!("  Bridge interface: {}", bridge_interface);
                info!("  Flannel interface: {}", flannel_interface);
                info!("  Flannel env file: {}", env_file.display());
            }
            HealthMode::Kvm {
                guest_ip,
                check_api,
            } => {
                info!("  Guest IP: {}", guest_ip);
                info!("  API check: {}", if *check_api { "enabled" } else { "disabled" });
            }
        }

        match self.server.health_timeout.as_duration() {
            Some(timeout) => info!("  Health timeout: {}ms", timeout.as_millis()),
            None => info!("  Health timeout: disabled"),
        }
    }
}

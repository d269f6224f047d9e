//! Logging configuration.

use super::parse::Env;
use super::ConfigError;

/// Default service name used in structured logs and `/version`.
pub const DEFAULT_SERVICE_NAME: &str = "network-health";

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: network_health=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&Env::process())
    }

    pub(crate) fn load<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            filter: Self::resolve_log_filter(env),
            service_name: env.or("SERVICE_NAME", DEFAULT_SERVICE_NAME),
        })
    }

    /// Resolve log filter.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter<F>(env: &Env<F>) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Check LOG_LEVEL first (simple: debug, info, warn, error)
        if let Some(level) = env.opt("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("network_health={}", level);
                }
                _ => {
                    // Logging is not up yet, so this goes straight to stderr
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        // 2. Check RUST_LOG (full tracing filter syntax)
        if let Some(filter) = env.opt("RUST_LOG") {
            return filter;
        }

        // 3. Default
        "network_health=info".to_string()
    }
}

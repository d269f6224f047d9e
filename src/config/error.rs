//! Configuration error types.

use std::fmt;

/// Error type for configuration loading.
///
/// Every variant is fatal at startup: the service must not start serving
/// with an incomplete configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Missing (or empty) required environment variable.
    Missing { key: String },
    /// Invalid value for environment variable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "invalid config: failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Missing { key } => {
                write!(f, "invalid config: {} must not be empty", key)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid config: {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

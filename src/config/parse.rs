//! Environment variable parsing utilities.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Source of configuration values.
///
/// Wraps a key lookup so the same parsing rules apply to the process
/// environment and to fixed maps in tests.
pub struct Env<F> {
    lookup: F,
}

fn process_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl Env<fn(&str) -> Option<String>> {
    /// Reads from the process environment.
    pub fn process() -> Self {
        Self {
            lookup: process_var,
        }
    }
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Get variable with default value.
    pub fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Get optional variable (None if empty or missing).
    pub fn opt(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Get required variable, empty counts as missing.
    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.opt(key)
            .ok_or_else(|| ConfigError::Missing { key: key.into() })
    }

    /// Parse variable as boolean.
    /// Treats "1", "true" (case-insensitive) as true.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.opt(key)
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(default)
    }

    /// Parse required variable with type conversion.
    pub fn parse_required<T: FromStr>(&self, key: &str) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        let value = self.required(key)?;
        value.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value,
            error: e.to_string(),
        })
    }

    /// Parse variable as duration.
    pub fn duration(&self, key: &str, default: &str) -> Result<Option<Duration>, ConfigError> {
        let value = self.or(key, default);
        parse_duration(&value).map_err(|e| ConfigError::Parse {
            key: key.into(),
            value,
            error: e,
        })
    }
}

/// Parse duration string (e.g., "500ms", "30s", "2m", "1h").
/// Returns None for "off" or "0".
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();

    if s == "off" || s == "0" || s.is_empty() {
        return Ok(None);
    }

    if let Some(num_str) = s.strip_suffix("ms") {
        let millis: u64 = num_str
            .parse()
            .map_err(|_| format!("invalid number: {}", num_str))?;
        return Ok(Some(Duration::from_millis(millis)));
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else {
        // Try parsing as seconds
        return s
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| format!("invalid duration: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let secs = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration too large: {}", s))?;

    Ok(Some(Duration::from_secs(secs)))
}

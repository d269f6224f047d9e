//! Logical targets to verify.

use std::fmt;
use std::net::Ipv4Addr;

use crate::config::ConfigError;

/// A named interface and the address it must carry.
///
/// Built once from configuration at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTarget {
    name: String,
    expected_address: Ipv4Addr,
}

impl NetworkTarget {
    pub fn new(name: impl Into<String>, expected_address: Ipv4Addr) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "interface".into(),
                message: format!("name for {} must not be empty", expected_address),
            });
        }

        Ok(Self {
            name,
            expected_address,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected_address(&self) -> Ipv4Addr {
        self.expected_address
    }
}

impl fmt::Display for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.expected_address)
    }
}

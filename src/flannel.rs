//! Flannel env file parsing.
//!
//! The flannel daemon writes a small `KEY=VALUE` file per network:
//!
//! ```text
//! FLANNEL_NETWORK=172.23.3.0/24
//! FLANNEL_SUBNET=172.23.3.65/30
//! FLANNEL_MTU=1450
//! FLANNEL_IPMASQ=false
//! ```
//!
//! Only the two CIDR fields matter here. The expected interface addresses
//! are derived from the *network address* of `FLANNEL_SUBNET`:
//!
//! - overlay (flannel interface) address: the subnet's network address,
//!   e.g. `172.23.3.64` for `172.23.3.65/30`
//! - bridge address: the first host after it, e.g. `172.23.3.65`
//!
//! `FLANNEL_NETWORK` is used to validate that the subnet lies inside the
//! declared network.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use pnet::ipnetwork::Ipv4Network;

pub const KEY_NETWORK: &str = "FLANNEL_NETWORK";
pub const KEY_SUBNET: &str = "FLANNEL_SUBNET";

/// Errors raised while deriving addresses from a flannel env file.
#[derive(Debug)]
pub enum FlannelError {
    /// The file could not be read.
    InvalidFile {
        path: PathBuf,
        error: std::io::Error,
    },
    /// Required keys are missing or the values are inconsistent.
    InvalidConfiguration(String),
    /// A CIDR value could not be parsed.
    FailedParsingSubnet {
        key: &'static str,
        value: String,
        error: String,
    },
}

impl FlannelError {
    /// True for every error that means "the file content is unusable".
    ///
    /// Parse failures are reported with their own message but are handled
    /// exactly like a missing or inconsistent configuration.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::FailedParsingSubnet { .. }
        )
    }

    pub fn is_failed_parsing_subnet(&self) -> bool {
        matches!(self, Self::FailedParsingSubnet { .. })
    }

    pub fn is_invalid_file(&self) -> bool {
        matches!(self, Self::InvalidFile { .. })
    }
}

impl fmt::Display for FlannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFile { path, error } => {
                write!(f, "invalid flannel file '{}': {}", path.display(), error)
            }
            Self::InvalidConfiguration(msg) => {
                write!(f, "invalid flannel configuration: {}", msg)
            }
            Self::FailedParsingSubnet { key, value, error } => {
                write!(
                    f,
                    "invalid flannel configuration: failed parsing {}='{}': {}",
                    key, value, error
                )
            }
        }
    }
}

impl std::error::Error for FlannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFile { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Addresses the bridge and flannel interfaces are expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkAddresses {
    pub overlay_ip: Ipv4Addr,
    pub bridge_ip: Ipv4Addr,
}

/// Read the env file at `path` and derive the expected addresses.
pub fn load_addresses(path: &Path) -> Result<NetworkAddresses, FlannelError> {
    let contents = std::fs::read(path).map_err(|error| FlannelError::InvalidFile {
        path: path.to_path_buf(),
        error,
    })?;
    extract_addresses(&contents)
}

/// Derive the expected addresses from raw env file contents.
pub fn extract_addresses(contents: &[u8]) -> Result<NetworkAddresses, FlannelError> {
    let text = String::from_utf8_lossy(contents);
    let record = parse_record(&text);

    let network = parse_cidr(&record, KEY_NETWORK)?;
    let subnet = parse_cidr(&record, KEY_SUBNET)?;

    if subnet.prefix() < network.prefix() || !network.contains(subnet.network()) {
        return Err(FlannelError::InvalidConfiguration(format!(
            "{} {} is not inside {} {}",
            KEY_SUBNET, subnet, KEY_NETWORK, network
        )));
    }

    let overlay_ip = subnet.network();
    let bridge_ip = next_address(overlay_ip).ok_or_else(|| {
        FlannelError::InvalidConfiguration(format!(
            "{} {} has no address after its network address",
            KEY_SUBNET, subnet
        ))
    })?;

    Ok(NetworkAddresses {
        overlay_ip,
        bridge_ip,
    })
}

/// Split lines on the first `=`; lines without one are skipped, last key wins.
fn parse_record(text: &str) -> HashMap<&str, &str> {
    text.lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}

fn parse_cidr(record: &HashMap<&str, &str>, key: &'static str) -> Result<Ipv4Network, FlannelError> {
    let value = record
        .get(key)
        .copied()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FlannelError::InvalidConfiguration(format!("{} is missing", key)))?;

    // A bare address would parse as /32, but flannel always writes a prefix
    if !value.contains('/') {
        return Err(FlannelError::FailedParsingSubnet {
            key,
            value: value.to_string(),
            error: "missing prefix length".to_string(),
        });
    }

    value
        .parse::<Ipv4Network>()
        .map_err(|e| FlannelError::FailedParsingSubnet {
            key,
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// The bridge sits one address above the subnet's network address, even for
/// /31 and /32 subnets.
fn next_address(addr: Ipv4Addr) -> Option<Ipv4Addr> {
    u32::from(addr).checked_add(1).map(Ipv4Addr::from)
}

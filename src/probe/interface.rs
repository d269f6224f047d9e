//! Interface presence and address check.

use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;
use tracing::debug;

use super::Step;

/// Snapshot source of the host's network interfaces.
pub trait InterfaceTable: Send + Sync {
    fn interfaces(&self) -> Vec<NetworkInterface>;
}

/// Live interface table of this host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceTable for SystemInterfaces {
    fn interfaces(&self) -> Vec<NetworkInterface> {
        pnet::datalink::interfaces()
    }
}

/// Verify that interface `name` exists and its first IPv4 address is `expected`.
///
/// Only the first bound IPv4 address is compared; further addresses on the
/// same interface are ignored.
pub fn check_interface(table: &dyn InterfaceTable, name: &str, expected: Ipv4Addr) -> Step {
    let interface = match table.interfaces().into_iter().find(|i| i.name == name) {
        Some(interface) => interface,
        None => return Step::Fail(format!("Can't find interface {}.", name)),
    };

    let found = match first_ipv4(&interface) {
        Some(ip) => ip,
        None => {
            return Step::Fail(format!(
                "Missing ip {} on the interface {}.",
                expected, name
            ))
        }
    };

    debug!(interface = name, %expected, %found, "Interface address lookup");

    if found.to_string() != expected.to_string() {
        return Step::Fail(format!(
            "Wrong ip on interface {}. Expected {}, but found {}.",
            name, expected, found
        ));
    }

    Step::Pass(format!(
        "Healthcheck for interface {} has been successful. Interface is present and configured with ip {}.",
        name, expected
    ))
}

fn first_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) => Some(v4.ip()),
        IpNetwork::V6(_) => None,
    })
}

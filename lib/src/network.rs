//! Provides helpers for selecting the interface packets are replayed on

use crate::error::{ReplayLibError, Result};

pub use pnet::datalink::NetworkInterface;

/// Returns the interface with the given name
pub fn get_interface(name: &str) -> Result<NetworkInterface> {
    pnet::datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| {
            ReplayLibError::Wire(format!("could not find interface: {name}"))
        })
}

/// Returns the first interface that is up, not a loopback, and has an IPv4
/// address
pub fn get_default_interface() -> Result<NetworkInterface> {
    pnet::datalink::interfaces()
        .into_iter()
        .find(|e| {
            e.is_up() && !e.is_loopback() && e.ips.iter().any(|i| i.is_ipv4())
        })
        .ok_or_else(|| {
            ReplayLibError::Wire(
                "could not detect default network interface".into(),
            )
        })
}

#[cfg(test)]
#[path = "./network_tests.rs"]
mod tests;

//! # Interface Resolution
//!
//! Picks the interface a scan goes out on and works out the local address
//! pair (IPv4 + MAC) that every probe is sent from.

use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::util::MacAddr;
use serde::Serialize;
use tracing::debug;

use crate::error::ScanError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback never reaches the LAN.
    IsLoopback,
    /// The interface has no IPv4 address to send ARP from.
    NoIpv4Address,
}

/// What the outer layers get to see about the scanning interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub interface_name: String,
    #[serde(rename = "ip")]
    pub address: Ipv4Addr,
    /// The interface's own address with its prefix, e.g. `192.168.1.23/24`.
    #[serde(rename = "cidr")]
    pub subnet: String,
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_net(&self) -> Option<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_net(&self) -> Option<Ipv4Network> {
        self.ips.iter().find_map(|ip| match ip {
            IpNetwork::V4(ipv4) => Some(*ipv4),
            IpNetwork::V6(_) => None,
        })
    }
}

/// The first interface that is up, not loopback, and carries an IPv4 address.
pub fn get_default_interface() -> Result<InterfaceInfo, ScanError> {
    select_default_interface(&datalink::interfaces())
}

/// Looks an interface up by name and describes it like [`get_default_interface`].
pub fn get_named_interface(name: &str) -> Result<InterfaceInfo, ScanError> {
    let interface = find_by_name(name)?;
    let net = interface
        .get_ipv4_net()
        .ok_or_else(|| ScanError::NoIpv4Address(interface.name.clone()))?;
    Ok(describe(&interface, net))
}

pub fn find_by_name(name: &str) -> Result<NetworkInterface, ScanError> {
    datalink::interfaces()
        .into_iter()
        .find(|interface| interface.name == name)
        .ok_or_else(|| ScanError::InterfaceNotFound(name.to_string()))
}

/// The address pair ARP requests are sent from: the first IPv4 address of
/// the interface and its hardware address.
pub fn local_pair(interface: &NetworkInterface) -> Result<(Ipv4Addr, MacAddr), ScanError> {
    let net = interface
        .get_ipv4_net()
        .ok_or_else(|| ScanError::NoIpv4Address(interface.name.clone()))?;
    let mac = interface
        .mac
        .filter(|mac| *mac != MacAddr::zero())
        .ok_or_else(|| ScanError::NoHardwareAddress(interface.name.clone()))?;
    Ok((net.ip(), mac))
}

fn select_default_interface(interfaces: &[NetworkInterface]) -> Result<InterfaceInfo, ScanError> {
    interfaces
        .iter()
        .find_map(|interface| match is_usable(interface) {
            Ok(net) => Some(describe(interface, net)),
            Err(reason) => {
                debug!(interface = %interface.name, ?reason, "skipping interface");
                None
            }
        })
        .ok_or(ScanError::NoUsableInterface)
}

fn is_usable(interface: &NetworkInterface) -> Result<Ipv4Network, ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    interface.get_ipv4_net().ok_or(ViabilityError::NoIpv4Address)
}

fn describe(interface: &NetworkInterface, net: Ipv4Network) -> InterfaceInfo {
    InterfaceInfo {
        interface_name: interface.name.clone(),
        address: net.ip(),
        subnet: format!("{}/{}", net.ip(), net.prefix()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

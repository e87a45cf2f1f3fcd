use std::net::Ipv4Addr;

use thiserror::Error;

/// Failures of a discovery run.
///
/// The structural variants abort a scan before anything is sent. `FrameBuild`
/// and `Transmit` only ever concern a single candidate and are logged by the
/// scanner instead of being returned.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("no usable network interface found")]
    NoUsableInterface,

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("no IPv4 address found on {0}")]
    NoIpv4Address(String),

    #[error("interface {0} has no hardware address")]
    NoHardwareAddress(String),

    #[error("invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("opening capture on {iface}")]
    CaptureOpen {
        iface: String,
        #[source]
        source: std::io::Error,
    },

    #[error("non-ethernet channel for {0}")]
    NonEthernetChannel(String),

    #[error("failed to build ARP request for {0}")]
    FrameBuild(Ipv4Addr),

    #[error("send to {addr} failed")]
    Transmit {
        addr: Ipv4Addr,
        #[source]
        source: std::io::Error,
    },
}

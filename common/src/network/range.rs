//! # Subnet Enumeration
//!
//! Expands a CIDR descriptor into every address it covers, network address
//! through broadcast address, in ascending order.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;

/// A base address plus prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    net: Ipv4Network,
}

impl Subnet {
    pub fn new(base: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        let net = Ipv4Network::new(base, prefix)
            .map_err(|_| ScanError::InvalidSubnet(format!("{base}/{prefix}")))?;
        Ok(Self { net })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.net.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.net.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.net.prefix()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.net.contains(addr)
    }

    /// Every address of the subnet except `sender`, which is the scanning
    /// interface's own address and never worth probing.
    pub fn hosts_excluding(&self, sender: Ipv4Addr) -> SubnetHosts {
        SubnetHosts {
            subnet: *self,
            next: Some(self.network()),
            skip: Some(sender),
        }
    }

    #[cfg(test)]
    pub fn hosts(&self) -> SubnetHosts {
        SubnetHosts {
            subnet: *self,
            next: Some(self.network()),
            skip: None,
        }
    }

    pub fn to_range(&self) -> Ipv4Range {
        Ipv4Range::new(self.network(), self.broadcast())
    }
}

impl FromStr for Subnet {
    type Err = ScanError;

    /// Parses `a.b.c.d/prefix`. The prefix is mandatory.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScanError::InvalidSubnet(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Ipv4Network::new(addr, prefix)
            .map(|net| Self { net })
            .map_err(|_| invalid())
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

/// Lazily walks a [`Subnet`]. Not restartable: once exhausted it stays empty.
#[derive(Debug, Clone)]
pub struct SubnetHosts {
    subnet: Subnet,
    next: Option<Ipv4Addr>,
    skip: Option<Ipv4Addr>,
}

impl Iterator for SubnetHosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next.take()?;
            if !self.subnet.contains(current) {
                return None;
            }
            self.next = increment(current);
            if Some(current) != self.skip {
                return Some(current);
            }
        }
    }
}

/// Big-endian increment with carry. `None` past 255.255.255.255.
fn increment(addr: Ipv4Addr) -> Option<Ipv4Addr> {
    u32::from(addr).checked_add(1).map(Ipv4Addr::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_addr, self.end_addr)
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

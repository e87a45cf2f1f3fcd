//! # Network Discovery Service
//!
//! The "scan my LAN" use case: pick the interface from the configuration,
//! work out the subnet and hand both to the ARP scanner together with the
//! vendor registry.

use std::sync::Arc;

use netsweep_common::Config;
use netsweep_common::ScanError;
use netsweep_common::network::device::Device;
use netsweep_common::network::interface::{self, InterfaceInfo};
use netsweep_common::vendors::VendorRepository;
use serde::Serialize;

use crate::scanner::{self, ScanOptions};

/// Result of one discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub interface: InterfaceInfo,
    pub subnet: String,
    pub devices: Vec<Device>,
}

pub struct DiscoveryService {
    vendor_repo: Arc<dyn VendorRepository>,
}

impl DiscoveryService {
    pub fn new(vendor_repo: Arc<dyn VendorRepository>) -> Self {
        Self { vendor_repo }
    }

    pub async fn perform_discovery(
        &self,
        cfg: &Config,
        opts: &ScanOptions,
    ) -> Result<DiscoveryReport, ScanError> {
        let info = resolve_interface(cfg)?;
        let subnet = cfg.subnet.clone().unwrap_or_else(|| info.subnet.clone());

        let devices =
            scanner::arp_scan(&info.interface_name, &subnet, self.vendor_repo.as_ref(), opts).await?;

        Ok(DiscoveryReport {
            interface: info,
            subnet,
            devices,
        })
    }
}

/// The configured interface, or the detected default when none is set.
pub fn resolve_interface(cfg: &Config) -> Result<InterfaceInfo, ScanError> {
    match cfg.interface.as_deref() {
        Some(name) => interface::get_named_interface(name),
        None => interface::get_default_interface(),
    }
}

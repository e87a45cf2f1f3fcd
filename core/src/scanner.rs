//! # ARP Scan Orchestration
//!
//! Ties the pieces of a single scan together: local address pair, target
//! enumeration, probe frames, capture handle, transmission, the listening
//! window and finally vendor enrichment.
//!
//! Structural failures (interface, subnet, capture) abort the scan before a
//! single frame is sent. Per-target failures never do.

use std::io;
use std::time::Duration;

use netsweep_common::Config;
use netsweep_common::ScanError;
use netsweep_common::config::{DEFAULT_HOSTNAME_TIMEOUT, DEFAULT_LISTEN_WINDOW};
use netsweep_common::network::device::Device;
use netsweep_common::network::interface;
use netsweep_common::network::range::Subnet;
use netsweep_common::vendors::VendorRepository;
use pnet::datalink::{self, Channel, NetworkInterface};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::network::channel;

pub mod local;
pub mod resolver;

use local::LocalScanner;

/// Per-scan settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub listen_window: Duration,
    pub resolve_hostnames: bool,
    pub hostname_timeout: Duration,
    /// Ends the listening window early once it reads `true`.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            listen_window: DEFAULT_LISTEN_WINDOW,
            resolve_hostnames: true,
            hostname_timeout: DEFAULT_HOSTNAME_TIMEOUT,
            cancel: None,
        }
    }
}

impl From<&Config> for ScanOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            listen_window: cfg.listen_window,
            resolve_hostnames: !cfg.no_dns,
            hostname_timeout: cfg.hostname_timeout,
            cancel: None,
        }
    }
}

impl ScanOptions {
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Scans `subnet` (CIDR notation) through the interface called
/// `interface_name` and returns every device that answered, in arrival order.
pub async fn arp_scan(
    interface_name: &str,
    subnet: &str,
    vendors: &dyn VendorRepository,
    opts: &ScanOptions,
) -> Result<Vec<Device>, ScanError> {
    let intf = interface::find_by_name(interface_name)?;
    arp_scan_with(&intf, subnet, vendors, opts, datalink::channel).await
}

/// [`arp_scan`] on an already resolved interface, with the datalink channel
/// constructor supplied by the caller.
pub async fn arp_scan_with<F>(
    intf: &NetworkInterface,
    subnet: &str,
    vendors: &dyn VendorRepository,
    opts: &ScanOptions,
    channel_opener: F,
) -> Result<Vec<Device>, ScanError>
where
    F: FnOnce(&NetworkInterface, datalink::Config) -> io::Result<Channel>,
{
    let (src_addr, src_mac) = interface::local_pair(intf)?;
    let subnet: Subnet = subnet.parse()?;

    let probes = local::build_probes(src_mac, src_addr, subnet.hosts_excluding(src_addr));
    info!(
        interface = %intf.name,
        %subnet,
        range = %subnet.to_range(),
        targets = probes.len(),
        "starting ARP scan"
    );

    // Capture must be live before the first request leaves.
    let eth_handle = channel::start_capture_with(intf, channel_opener)?;
    let mut devices = LocalScanner::new(eth_handle, probes)
        .discover_hosts(opts)
        .await;

    enrich_vendors(&mut devices, vendors);
    info!(found = devices.len(), "ARP scan finished");
    Ok(devices)
}

fn enrich_vendors(devices: &mut [Device], vendors: &dyn VendorRepository) {
    for device in devices.iter_mut() {
        let vendor = vendors.get_vendor(device.mac);
        debug!(ip = %device.address, %vendor, "vendor resolved");
        device.vendor = Some(vendor);
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

use colored::*;
use netsweep_common::network::device::Device;
use netsweep_common::vendors::UNKNOWN_VENDOR;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn device_to_details(device: &Device) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), device.address.to_string().color(colors::IPV4_ADDR)),
        ("MAC".to_string(), device.mac.to_string().color(colors::MAC_ADDR)),
    ];
    if let Some(vendor) = vendor_to_detail(device.vendor.as_deref()) {
        details.push(vendor);
    }
    details
}

fn vendor_to_detail(vendor: Option<&str>) -> Option<Detail> {
    let vendor = vendor?;
    let value = if vendor == UNKNOWN_VENDOR {
        vendor.color(colors::SEPARATOR).italic()
    } else {
        vendor.color(colors::VENDOR)
    };
    Some(("Vendor".to_string(), value))
}

/// `192.168.1.23/24` with address and prefix colored separately.
pub fn cidr(cidr: &str) -> ColoredString {
    match cidr.split_once('/') {
        Some((addr, prefix)) => format!(
            "{}{}{}",
            addr.color(colors::IPV4_ADDR),
            "/".color(colors::SEPARATOR),
            prefix.color(colors::IPV4_PREFIX)
        )
        .normal(),
        None => cidr.color(colors::IPV4_ADDR),
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

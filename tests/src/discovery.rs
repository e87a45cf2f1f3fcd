use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use netsweep_common::ScanError;
use netsweep_common::network::device::Device;
use netsweep_common::vendors::UNKNOWN_VENDOR;
use netsweep_core::scanner::{self, ScanOptions};
use netsweep_core::VendorRegistry;
use pnet::util::MacAddr;
use tokio::sync::watch;

use crate::utils::{self, Neighbor, SimulatedLan};

const ROUTER_MAC: MacAddr = MacAddr(0xdc, 0x4b, 0xa1, 0x00, 0x00, 0x01);
const PRINTER_MAC: MacAddr = MacAddr(0x00, 0x0c, 0x29, 0x12, 0x34, 0x56);

fn quick_options() -> ScanOptions {
    ScanOptions {
        listen_window: Duration::from_millis(300),
        resolve_hostnames: false,
        ..ScanOptions::default()
    }
}

fn registry_with_acme(dir: &std::path::Path) -> VendorRegistry {
    VendorRegistry::new(utils::write_oui_csv(dir, &[("DC4BA1", "Acme Corp")]))
}

#[tokio::test]
async fn every_host_in_a_slash_30_is_probed_except_ourselves() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let local = Ipv4Addr::new(192, 168, 1, 1);
    let mut lan = SimulatedLan::new(HashMap::new());

    let devices = scanner::arp_scan_with(
        &utils::lan_interface(local, 30),
        "192.168.1.0/30",
        &registry,
        &quick_options(),
        lan.opener(),
    )
    .await
    .unwrap();

    assert!(devices.is_empty(), "silent network must yield no devices");
    assert_eq!(
        lan.requests(),
        vec![
            Ipv4Addr::new(192, 168, 1, 0),
            Ipv4Addr::new(192, 168, 1, 2),
            Ipv4Addr::new(192, 168, 1, 3),
        ]
    );
}

#[tokio::test]
async fn responding_hosts_are_reported_with_vendors() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let printer = Ipv4Addr::new(10, 0, 0, 9);
    let mut lan = SimulatedLan::new(HashMap::from([
        (router, Neighbor::new(ROUTER_MAC)),
        (printer, Neighbor::new(PRINTER_MAC)),
    ]));

    let devices = scanner::arp_scan_with(
        &utils::lan_interface(Ipv4Addr::new(10, 0, 0, 5), 28),
        "10.0.0.0/28",
        &registry,
        &quick_options(),
        lan.opener(),
    )
    .await
    .unwrap();

    assert_eq!(
        devices,
        vec![
            Device::new(router, ROUTER_MAC).with_vendor("Acme Corp"),
            Device::new(printer, PRINTER_MAC).with_vendor(UNKNOWN_VENDOR),
        ]
    );
    assert_eq!(lan.requests().len(), 15);
}

#[tokio::test]
async fn repeated_replies_are_not_merged() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let mut lan = SimulatedLan::new(HashMap::from([(router, Neighbor::chatty(ROUTER_MAC, 2))]));

    let devices = scanner::arp_scan_with(
        &utils::lan_interface(Ipv4Addr::new(10, 0, 0, 5), 29),
        "10.0.0.0/29",
        &registry,
        &quick_options(),
        lan.opener(),
    )
    .await
    .unwrap();

    let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.address).collect();
    assert_eq!(ips, vec![router, router]);
}

#[tokio::test]
async fn subnet_override_is_scanned_instead_of_interface_network() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let mut lan = SimulatedLan::new(HashMap::new());

    scanner::arp_scan_with(
        &utils::lan_interface(Ipv4Addr::new(192, 168, 1, 10), 24),
        "172.16.0.0/31",
        &registry,
        &quick_options(),
        lan.opener(),
    )
    .await
    .unwrap();

    assert_eq!(
        lan.requests(),
        vec![Ipv4Addr::new(172, 16, 0, 0), Ipv4Addr::new(172, 16, 0, 1)]
    );
}

#[tokio::test]
async fn malformed_subnet_fails_before_anything_is_sent() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let mut lan = SimulatedLan::new(HashMap::new());

    let err = scanner::arp_scan_with(
        &utils::lan_interface(Ipv4Addr::new(10, 0, 0, 5), 24),
        "10.0.0.0/33",
        &registry,
        &quick_options(),
        lan.opener(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScanError::InvalidSubnet(_)));
    assert!(lan.requests().is_empty());
}

#[tokio::test]
async fn cancelled_scan_returns_what_was_collected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let mut lan = SimulatedLan::new(HashMap::from([(router, Neighbor::new(ROUTER_MAC))]));
    let (stop_tx, stop_rx) = watch::channel(false);

    let opts = ScanOptions {
        listen_window: Duration::from_secs(30),
        ..quick_options()
    }
    .with_cancel(stop_rx);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = stop_tx.send(true);
    });

    let started = std::time::Instant::now();
    let devices = scanner::arp_scan_with(
        &utils::lan_interface(Ipv4Addr::new(10, 0, 0, 5), 29),
        "10.0.0.0/29",
        &registry,
        &opts,
        lan.opener(),
    )
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(devices, vec![Device::new(router, ROUTER_MAC).with_vendor("Acme Corp")]);
}

#[tokio::test]
async fn registry_reload_between_scans_changes_vendors() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(registry_with_acme(dir.path()));
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let intf = utils::lan_interface(Ipv4Addr::new(10, 0, 0, 5), 30);

    let mut lan = SimulatedLan::new(HashMap::from([(router, Neighbor::new(ROUTER_MAC))]));
    let before = scanner::arp_scan_with(&intf, "10.0.0.4/30", registry.as_ref(), &quick_options(), lan.opener())
        .await
        .unwrap();

    utils::write_oui_csv(dir.path(), &[("DC4BA1", "Renamed Inc")]);
    registry.reload().unwrap();

    let mut lan = SimulatedLan::new(HashMap::from([(router, Neighbor::new(ROUTER_MAC))]));
    let after = scanner::arp_scan_with(&intf, "10.0.0.0/30", registry.as_ref(), &quick_options(), lan.opener())
        .await
        .unwrap();

    assert!(before.is_empty());
    assert_eq!(after[0].vendor.as_deref(), Some("Renamed Inc"));
}

/// Runs against a real veth pair. Skipped without root.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn privileged_discovery_netns() {
    let Some(ctx) = utils::NetnsContext::new("t1") else {
        eprintln!("Skipping netns test: requires root privileges and the 'ip' command.");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_acme(dir.path());

    let devices = scanner::arp_scan(&ctx.host_if, "10.200.0.0/30", &registry, &quick_options())
        .await
        .unwrap();

    assert!(
        devices.iter().any(|d| d.address == ctx.peer_addr),
        "peer {} not found in {devices:?}",
        ctx.peer_addr
    );
}

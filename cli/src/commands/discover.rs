use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use is_root::is_root;
use netsweep_common::Config;
use netsweep_common::network::device::Device;
use netsweep_core::{DiscoveryReport, DiscoveryService, ScanOptions, VendorRegistry};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::nprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(cfg: &Config, registry: Arc<VendorRegistry>) -> anyhow::Result<()> {
    if !is_root() {
        warn!("not running as root, opening the capture will most likely fail");
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, finishing early");
            let _ = stop_tx.send(true);
        }
    });

    let opts = ScanOptions::from(cfg).with_cancel(stop_rx);
    let service = DiscoveryService::new(registry);

    let start_time = Instant::now();
    let report = {
        let _spinner = spinner::start(&format!(
            "Probing the network... {}",
            "(Ctrl-C to finish early)".italic().bright_black()
        ));
        service.perform_discovery(cfg, &opts).await
    };
    ctrl_c.abort();

    let report = report.context("network discovery failed")?;
    discovery_ends(&report, start_time.elapsed());
    Ok(())
}

fn discovery_ends(report: &DiscoveryReport, total_time: Duration) {
    if report.devices.is_empty() {
        print::header("zero hosts detected");
        print::no_results();
        return;
    }

    print::header(&format!("{} on {}", report.subnet, report.interface.interface_name));
    print_devices(&report.devices);
    print_summary(report.devices.len(), total_time);
}

fn print_devices(devices: &[Device]) {
    for (idx, device) in devices.iter().enumerate() {
        let hostname = device.hostname.as_deref().unwrap_or("No hostname");
        print::tree_head(idx, hostname);
        print::as_tree_one_level(format::device_to_details(device));
        if idx + 1 != devices.len() {
            nprint!();
        }
    }
}

fn print_summary(replies: usize, total_time: Duration) {
    let replies: ColoredString = format!("{replies} replies").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Discovery Complete: {replies} received in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    print::fat_separator();
    print::centerln(&output);
}

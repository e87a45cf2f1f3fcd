//! A **local area network (LAN)** scanner.
//!
//! Broadcasts one ARP request per candidate address and then listens for
//! replies on the same capture handle until the listening window closes.
//!
//! This scanner requires **root privileges** to construct and intercept raw
//! Layer 2 packets via the operating system's network sockets.

use std::net::Ipv4Addr;
use std::time::Duration;

use netsweep_common::ScanError;
use netsweep_common::network::device::Device;
use pnet::datalink::DataLinkSender;
use pnet::util::MacAddr;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::network::arp::{self, ArpReply};
use crate::network::channel::EthernetHandle;

use super::ScanOptions;
use super::resolver::HostnameResolver;

/// A ready-to-send ARP request and the address it asks about.
#[derive(Debug, Clone)]
pub struct Probe {
    pub target: Ipv4Addr,
    pub frame: Vec<u8>,
}

pub struct LocalScanner {
    eth_handle: EthernetHandle,
    probes: Vec<Probe>,
}

impl LocalScanner {
    pub fn new(eth_handle: EthernetHandle, probes: Vec<Probe>) -> Self {
        Self { eth_handle, probes }
    }

    /// Sends every probe, then collects replies for the configured window.
    ///
    /// Consumes the scanner so the capture handle is released on return.
    pub async fn discover_hosts(mut self, opts: &ScanOptions) -> Vec<Device> {
        let sent = transmit(self.eth_handle.tx.as_mut(), &self.probes);
        debug!(sent, total = self.probes.len(), "probes transmitted");

        let resolver = opts
            .resolve_hostnames
            .then(|| HostnameResolver::new(opts.hostname_timeout));

        collect_replies(
            &mut self.eth_handle.rx,
            opts.listen_window,
            opts.cancel.clone(),
            resolver,
        )
        .await
    }
}

/// One probe per target. A target whose frame cannot be built is skipped.
pub fn build_probes(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    targets: impl IntoIterator<Item = Ipv4Addr>,
) -> Vec<Probe> {
    targets
        .into_iter()
        .filter_map(|target| match arp::create_request(src_mac, src_addr, target) {
            Ok(frame) => Some(Probe { target, frame }),
            Err(e) => {
                warn!(error = %e, "skipping candidate");
                None
            }
        })
        .collect()
}

/// Writes each probe to the wire. Failed sends are logged and do not stop
/// the batch. Returns how many went out.
pub fn transmit(tx: &mut dyn DataLinkSender, probes: &[Probe]) -> usize {
    let mut sent = 0;
    for probe in probes {
        match tx.send_to(&probe.frame, None) {
            Some(Ok(())) => sent += 1,
            Some(Err(source)) => {
                let e = ScanError::Transmit {
                    addr: probe.target,
                    source,
                };
                debug!(error = %e, cause = ?std::error::Error::source(&e), "send failed");
            }
            None => debug!(target = %probe.target, "sender does not support send_to"),
        }
    }
    sent
}

/// Drains `rx` until `window` elapses or `cancel` flips to `true`, turning
/// every ARP reply into a [`Device`] in arrival order.
///
/// Repeated replies from one host produce repeated entries. An empty result
/// is a normal outcome.
///
/// With a `resolver`, lookups still in flight when collection stops are
/// awaited before returning. Each one is capped by the resolver's timeout,
/// so the call can outlast `window` by at most that timeout.
pub async fn collect_replies(
    rx: &mut mpsc::Receiver<ArpReply>,
    window: Duration,
    mut cancel: Option<watch::Receiver<bool>>,
    mut resolver: Option<HostnameResolver>,
) -> Vec<Device> {
    let mut devices: Vec<Device> = Vec::new();
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(reply) = queued else {
                    debug!("capture queue closed before the window elapsed");
                    break;
                };
                debug!(ip = %reply.sender_addr, mac = %reply.sender_mac, "ARP reply");
                if let Some(resolver) = resolver.as_mut() {
                    resolver.spawn(devices.len(), reply.sender_addr);
                }
                devices.push(Device::new(reply.sender_addr, reply.sender_mac));
            }

            _ = &mut deadline => break,

            _ = cancelled(cancel.as_mut()) => {
                debug!(found = devices.len(), "collection cancelled");
                break;
            }
        }
    }

    if let Some(resolver) = resolver {
        resolver.resolve_into(&mut devices).await;
    }
    devices
}

/// Resolves once the signal reads `true`. A missing or abandoned signal
/// never resolves.
async fn cancelled(signal: Option<&mut watch::Receiver<bool>>) {
    if let Some(rx) = signal {
        if rx.wait_for(|stop| *stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

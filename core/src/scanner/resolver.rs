//! Reverse DNS for discovered hosts.
//!
//! Lookups run on the blocking pool as replies arrive, so a slow resolver
//! never holds up reply collection. Each lookup has its own deadline.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use netsweep_common::network::device::Device;
use tokio::task::JoinSet;
use tracing::debug;

type Lookup = Arc<dyn Fn(Ipv4Addr) -> Option<String> + Send + Sync>;

pub struct HostnameResolver {
    timeout: Duration,
    lookup: Lookup,
    pending: JoinSet<(usize, Option<String>)>,
}

impl HostnameResolver {
    /// Resolver backed by the system's reverse lookup.
    pub fn new(timeout: Duration) -> Self {
        Self::with_lookup(timeout, system_lookup)
    }

    pub fn with_lookup<F>(timeout: Duration, lookup: F) -> Self
    where
        F: Fn(Ipv4Addr) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            timeout,
            lookup: Arc::new(lookup),
            pending: JoinSet::new(),
        }
    }

    /// Starts a lookup for the device at position `slot`.
    pub fn spawn(&mut self, slot: usize, addr: Ipv4Addr) {
        let lookup = Arc::clone(&self.lookup);
        let limit = self.timeout;
        self.pending.spawn(async move {
            let task = tokio::task::spawn_blocking(move || lookup(addr));
            let name = match tokio::time::timeout(limit, task).await {
                Ok(Ok(name)) => name.as_deref().and_then(clean_hostname),
                Ok(Err(e)) => {
                    debug!(ip = %addr, error = %e, "hostname lookup task failed");
                    None
                }
                Err(_) => {
                    debug!(ip = %addr, "hostname lookup timed out");
                    None
                }
            };
            (slot, name)
        });
    }

    /// Waits for every outstanding lookup and fills in hostnames.
    pub async fn resolve_into(mut self, devices: &mut [Device]) {
        while let Some(joined) = self.pending.join_next().await {
            let Ok((slot, Some(name))) = joined else {
                continue;
            };
            if let Some(device) = devices.get_mut(slot) {
                device.hostname = Some(name);
            }
        }
    }
}

fn system_lookup(addr: Ipv4Addr) -> Option<String> {
    dns_lookup::lookup_addr(&IpAddr::V4(addr)).ok()
}

/// Strips the trailing root dot. Empty names and bare addresses are not
/// hostnames.
fn clean_hostname(raw: &str) -> Option<String> {
    let name = raw.trim().trim_end_matches('.');
    if name.is_empty() || name.parse::<IpAddr>().is_ok() {
        return None;
    }
    Some(name.to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

//! Link-layer capture handle.
//!
//! Opening a handle spawns a reader thread that drains the interface and
//! queues only the ARP replies it sees. Our own outgoing requests and any
//! other traffic are dropped at the reader, so the bounded queue holds
//! answers alone. The thread owns the receive side of the socket and exits
//! once the handle's queue receiver is gone, so dropping an
//! [`EthernetHandle`] releases both directions of the channel.

use std::io;
use std::time::Duration;

use netsweep_common::ScanError;
use pnet::datalink::{Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::arp::{self, ArpReply};

const READ_TIMEOUT: Duration = Duration::from_millis(50);
const QUEUE_CAPACITY: usize = 1024;

pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: mpsc::Receiver<ArpReply>,
}

/// Opens an Ethernet channel on `intf` through `channel_opener` and starts
/// draining it. Live scans pass [`pnet::datalink::channel`]; tests plug in pnet's
/// dummy datalink.
pub fn start_capture_with<F>(intf: &NetworkInterface, channel_opener: F) -> Result<EthernetHandle, ScanError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    let (tx, rx_socket) = open_eth_channel(intf, &get_config(), channel_opener)?;
    let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
    spawn_reader(intf.name.clone(), rx_socket, queue_tx);
    Ok(EthernetHandle { tx, rx: queue_rx })
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>), ScanError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    let ch = channel_opener(intf, *cfg).map_err(|source| ScanError::CaptureOpen {
        iface: intf.name.clone(),
        source,
    })?;
    match ch {
        Channel::Ethernet(tx, rx) => {
            debug!(interface = %intf.name, "capture channel established");
            Ok((tx, rx))
        }
        _ => Err(ScanError::NonEthernetChannel(intf.name.clone())),
    }
}

fn spawn_reader(name: String, mut rx: Box<dyn DataLinkReceiver>, queue: mpsc::Sender<ArpReply>) {
    std::thread::spawn(move || {
        while !queue.is_closed() {
            match rx.next() {
                Ok(frame) => {
                    let Some(reply) = arp::parse_reply(frame) else {
                        continue;
                    };
                    if queue.blocking_send(reply).is_err() {
                        break;
                    }
                }
                Err(e) if is_transient(&e) => continue,
                Err(e) => {
                    debug!(interface = %name, error = %e, "capture reader stopped");
                    break;
                }
            }
        }
        trace!(interface = %name, "capture reader released");
    });
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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

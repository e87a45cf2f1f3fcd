use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

use pnet::datalink::{Channel, NetworkInterface, dummy};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

pub const SCANNER_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);

/// Scanning interface `eth0` at `addr/prefix`.
pub fn lan_interface(addr: Ipv4Addr, prefix: u8) -> NetworkInterface {
    let mut intf = dummy::dummy_interface(0);
    intf.mac = Some(SCANNER_MAC);
    intf.ips = vec![IpNetwork::V4(Ipv4Network::new(addr, prefix).unwrap())];
    intf
}

/// A host on the simulated segment.
#[derive(Clone, Copy)]
pub struct Neighbor {
    pub mac: MacAddr,
    /// How many replies one request triggers.
    pub replies: usize,
}

impl Neighbor {
    pub fn new(mac: MacAddr) -> Self {
        Self { mac, replies: 1 }
    }

    pub fn chatty(mac: MacAddr, replies: usize) -> Self {
        Self { mac, replies }
    }
}

/// In-memory Ethernet segment: answers ARP requests for known neighbors
/// and records every request the scanner puts on the wire.
pub struct SimulatedLan {
    config: Option<dummy::Config>,
    responder: Option<JoinHandle<Vec<Ipv4Addr>>>,
}

impl SimulatedLan {
    pub fn new(neighbors: HashMap<Ipv4Addr, Neighbor>) -> Self {
        let mut config = dummy::Config::default();
        let inject = config.inject_handle().unwrap();
        let wire = config.read_handle().unwrap();

        let responder = thread::spawn(move || {
            let mut asked = Vec::new();
            // Ends once the scanner drops its sender.
            while let Ok(frame) = wire.recv() {
                let Some((target, requester_mac, requester_ip)) = parse_request(&frame) else {
                    continue;
                };
                asked.push(target);
                let Some(neighbor) = neighbors.get(&target) else {
                    continue;
                };
                for _ in 0..neighbor.replies {
                    let reply = reply_frame(target, neighbor.mac, requester_ip, requester_mac);
                    if inject.send(Ok(reply.into_boxed_slice())).is_err() {
                        return asked;
                    }
                }
            }
            asked
        });

        Self {
            config: Some(config),
            responder: Some(responder),
        }
    }

    /// Channel constructor to hand to the scanner. Usable once.
    pub fn opener(&mut self) -> impl FnOnce(&NetworkInterface, pnet::datalink::Config) -> io::Result<Channel> + use<> {
        let config = self.config.take().expect("opener already taken");
        move |intf, _| dummy::channel(intf, config)
    }

    /// Addresses the scanner asked about, in the order the requests went out.
    pub fn requests(mut self) -> Vec<Ipv4Addr> {
        self.config.take();
        self.responder
            .take()
            .expect("responder already joined")
            .join()
            .unwrap()
    }
}

fn parse_request(frame: &[u8]) -> Option<(Ipv4Addr, MacAddr, Ipv4Addr)> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp || eth.get_destination() != MacAddr::broadcast() {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Request {
        return None;
    }
    Some((
        arp.get_target_proto_addr(),
        arp.get_sender_hw_addr(),
        arp.get_sender_proto_addr(),
    ))
}

pub fn reply_frame(
    sender_ip: Ipv4Addr,
    sender_mac: MacAddr,
    target_ip: Ipv4Addr,
    target_mac: MacAddr,
) -> Vec<u8> {
    let mut buffer = vec![0u8; 42];
    {
        let mut eth = MutableEthernetPacket::new(&mut buffer).unwrap();
        eth.set_destination(target_mac);
        eth.set_source(sender_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }
    let mut arp = MutableArpPacket::new(&mut buffer[14..]).unwrap();
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Reply);
    arp.set_sender_hw_addr(sender_mac);
    arp.set_sender_proto_addr(sender_ip);
    arp.set_target_hw_addr(target_mac);
    arp.set_target_proto_addr(target_ip);
    buffer
}

/// Writes `rows` as a sanitized OUI database and returns its path.
pub fn write_oui_csv(dir: &Path, rows: &[(&str, &str)]) -> PathBuf {
    let mut body = String::from("OUI,OrganizationName\n");
    for (oui, org) in rows {
        body.push_str(&format!("{oui},{org}\n"));
    }
    let path = dir.join("oui.csv");
    std::fs::write(&path, body).unwrap();
    path
}

/// A veth pair with one end inside a throwaway network namespace.
///
/// Only available to root on Linux with `ip` installed.
pub struct NetnsContext {
    pub name: String,
    pub host_if: String,
    pub peer_addr: Ipv4Addr,
}

impl NetnsContext {
    pub fn new(name: &str) -> Option<Self> {
        if !is_root::is_root() {
            return None;
        }
        let ns = format!("netsweep-{name}");
        let host_if = format!("nsw-{name}-h");
        let peer_if = format!("nsw-{name}-p");
        let peer_addr = Ipv4Addr::new(10, 200, 0, 2);

        let steps: [Vec<&str>; 7] = [
            vec!["netns", "add", &ns],
            vec!["link", "add", &host_if, "type", "veth", "peer", "name", &peer_if],
            vec!["link", "set", &peer_if, "netns", &ns],
            vec!["addr", "add", "10.200.0.1/24", "dev", &host_if],
            vec!["link", "set", &host_if, "up"],
            vec!["-n", &ns, "addr", "add", "10.200.0.2/24", "dev", &peer_if],
            vec!["-n", &ns, "link", "set", &peer_if, "up"],
        ];
        let ctx = Self {
            name: ns.clone(),
            host_if: host_if.clone(),
            peer_addr,
        };
        for args in steps {
            if !ip(&args) {
                return None;
            }
        }
        Some(ctx)
    }
}

impl Drop for NetnsContext {
    fn drop(&mut self) {
        ip(&["link", "del", &self.host_if]);
        ip(&["netns", "del", &self.name]);
    }
}

fn ip(args: &[&str]) -> bool {
    Command::new("ip")
        .args(args)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

//! ARP request frames out, ARP replies in.

use std::net::Ipv4Addr;

use netsweep_common::ScanError;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;

const HW_ADDR_LEN: u8 = 6;
const PROTO_ADDR_LEN: u8 = 4;

/// Sender half of an ARP reply: who answered, and from which MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpReply {
    pub sender_addr: Ipv4Addr,
    pub sender_mac: MacAddr,
}

/// Builds a broadcast Ethernet frame carrying an ARP who-has for `target_addr`.
///
/// The frame is padded to the minimum Ethernet length.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<Vec<u8>, ScanError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    {
        let mut eth = MutableEthernetPacket::new(&mut buffer[..ETH_HDR_LEN + ARP_LEN])
            .ok_or(ScanError::FrameBuild(target_addr))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(ScanError::FrameBuild(target_addr))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(HW_ADDR_LEN);
    arp.set_proto_addr_len(PROTO_ADDR_LEN);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_addr);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target_addr);

    Ok(Vec::from(buffer))
}

/// Decodes `frame` and returns its sender if it is an IPv4 ARP reply.
/// Everything else, truncated frames included, is `None`.
pub fn parse_reply(frame: &[u8]) -> Option<ArpReply> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply || arp.get_protocol_type() != EtherTypes::Ipv4 {
        return None;
    }
    Some(ArpReply {
        sender_addr: arp.get_sender_proto_addr(),
        sender_mac: arp.get_sender_hw_addr(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

pub mod arp;
pub mod channel;

pub mod discovery;
pub mod network;
pub mod scanner;
pub mod update;
pub mod vendors;

pub use discovery::{DiscoveryReport, DiscoveryService};
pub use scanner::{ScanOptions, arp_scan};
pub use vendors::VendorRegistry;

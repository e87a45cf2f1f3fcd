//! Shared building blocks for netsweep.
//!
//! Holds the models handed between the scanner and its consumers, the error
//! taxonomy, and the small pieces of address math used on both sides of a
//! scan (subnet enumeration, OUI normalization, interface resolution).

pub mod config;
pub mod error;
pub mod network;
pub mod vendors;

pub use config::Config;
pub use error::ScanError;

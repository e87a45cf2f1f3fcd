use pnet::util::MacAddr;

/// Returned for hardware addresses whose OUI is not in the table.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Resolves the manufacturer behind a hardware address.
///
/// Implementations must never fail a lookup: anything they cannot resolve
/// comes back as [`UNKNOWN_VENDOR`].
pub trait VendorRepository: Send + Sync {
    fn get_vendor(&self, mac: MacAddr) -> String;
}

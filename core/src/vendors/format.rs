//! Header sniffing for the OUI CSV variants the registry accepts.

use std::fmt;

use csv::StringRecord;
use netsweep_common::network::mac::{OUI_LEN, normalize_oui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
    /// `OUI,OrganizationName`, as written by the updater.
    Sanitized,
    /// `Assignment,Organization Name,...`, the IEEE download as-is.
    Raw,
    /// `Registry,Assignment,Organization Name,...`
    Extended,
    /// Anything else, read as `key,organization`.
    Fallback,
}

impl CsvFormat {
    pub fn classify(header: &StringRecord) -> Self {
        if header.len() < 2 {
            return Self::Fallback;
        }
        let column = |idx: usize| header.get(idx).unwrap_or_default().trim().to_ascii_lowercase();
        let (h0, h1) = (column(0), column(1));

        if header.len() >= 3 && h0 == "registry" && h1 == "assignment" {
            Self::Extended
        } else if h0 == "oui" && (h1 == "organizationname" || h1 == "organization") {
            Self::Sanitized
        } else if h0 == "assignment" && h1.starts_with("organization") {
            Self::Raw
        } else {
            Self::Fallback
        }
    }

    /// Pulls `(oui, organization)` out of a data row, or `None` when the row
    /// does not carry a usable entry.
    pub fn extract(self, record: &StringRecord) -> Option<(String, String)> {
        let (key_idx, org_idx) = match self {
            Self::Sanitized | Self::Raw | Self::Fallback => (0, 1),
            Self::Extended => (1, 2),
        };
        let key = normalize_oui(record.get(key_idx)?.trim());
        let org = record.get(org_idx)?.trim();
        if key.len() != OUI_LEN || org.is_empty() {
            return None;
        }
        Some((key, org.to_string()))
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sanitized => "sanitized",
            Self::Raw => "raw",
            Self::Extended => "extended",
            Self::Fallback => "fallback",
        };
        f.write_str(name)
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

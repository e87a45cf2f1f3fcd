//! # Vendor Registry
//!
//! In-memory OUI table backed by a CSV file on disk.
//!
//! The table is loaded lazily on first use and can be reloaded at any time
//! while scans are reading from it. A reload builds a complete new table
//! before taking the write lock and swaps it in whole, so a reader holding
//! the shared lock sees either the old table or the new one and nothing in
//! between.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once, PoisonError, RwLock};

use netsweep_common::network::mac::{OUI_LEN, normalize_oui};
use netsweep_common::vendors::{UNKNOWN_VENDOR, VendorRepository};
use pnet::util::MacAddr;
use thiserror::Error;
use tracing::{debug, info, warn};

mod format;

pub use format::CsvFormat;

/// OUI (six uppercase hex digits) to organization name.
pub type VendorTable = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("open OUI db at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read CSV header")]
    Header(#[source] csv::Error),

    #[error("CSV header row is missing")]
    MissingHeader,

    #[error("CSV read error")]
    Read(#[source] csv::Error),
}

pub struct VendorRegistry {
    path: PathBuf,
    loaded: Once,
    table: RwLock<Arc<VendorTable>>,
}

impl VendorRegistry {
    /// Creates an empty registry reading from `path`. Nothing is read until
    /// the first lookup or an explicit [`reload`](Self::reload).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Once::new(),
            table: RwLock::new(Arc::new(VendorTable::new())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the table once per registry. Concurrent callers wait for the
    /// first load to finish. A failed load leaves an empty table behind.
    pub fn ensure_loaded(&self) {
        self.loaded.call_once(|| match load_table(&self.path) {
            Ok(table) => {
                info!(path = %self.path.display(), entries = table.len(), "OUI database loaded");
                self.swap(table);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load OUI database, vendor lookups disabled");
                self.swap(VendorTable::new());
            }
        });
    }

    /// Re-reads the CSV unconditionally and replaces the whole table.
    /// On error the current table stays in place.
    pub fn reload(&self) -> Result<usize, RegistryError> {
        // An initial load still in flight must not land after this one.
        self.ensure_loaded();
        let table = load_table(&self.path)?;
        let entries = table.len();
        self.swap(table);
        info!(path = %self.path.display(), entries, "OUI database reloaded");
        Ok(entries)
    }

    /// Organization behind `mac`, or [`UNKNOWN_VENDOR`].
    pub fn lookup(&self, mac: &str) -> String {
        self.ensure_loaded();

        let oui = normalize_oui(mac);
        if oui.len() < OUI_LEN {
            return UNKNOWN_VENDOR.to_string();
        }

        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .get(&oui)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_VENDOR.to_string())
    }

    /// The table as of now. Later reloads do not affect the returned value.
    pub fn snapshot(&self) -> Arc<VendorTable> {
        self.ensure_loaded();
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn swap(&self, table: VendorTable) {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(table);
    }
}

impl VendorRepository for VendorRegistry {
    fn get_vendor(&self, mac: MacAddr) -> String {
        self.lookup(&mac.to_string())
    }
}

pub fn load_table(path: &Path) -> Result<VendorTable, RegistryError> {
    let file = File::open(path).map_err(|source| RegistryError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(BufReader::new(file))
}

/// Reads any of the accepted CSV layouts into a table. Rows that do not
/// carry a six-digit OUI and an organization are skipped.
pub fn parse_table<R: io::Read>(source: R) -> Result<VendorTable, RegistryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let header = reader.headers().map_err(RegistryError::Header)?;
    if header.is_empty() {
        return Err(RegistryError::MissingHeader);
    }
    let format = CsvFormat::classify(header);
    debug!(%format, "detected OUI CSV layout");

    let mut table = VendorTable::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(RegistryError::Read(e)),
            Err(e) => {
                debug!(error = %e, "skipping malformed CSV row");
                skipped += 1;
                continue;
            }
        };
        match format.extract(&record) {
            Some((oui, org)) => {
                table.insert(oui, org);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "ignored unusable OUI rows");
    }
    Ok(table)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

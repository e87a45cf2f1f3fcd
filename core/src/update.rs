//! # OUI Updater
//!
//! Fetches the IEEE MA-L registry, rewrites it into the two-column
//! `OUI,OrganizationName` schema the [`VendorRegistry`] reads and replaces
//! the file on disk in one rename.
//!
//! When the replaced file is the one the registry serves from, the registry
//! is reloaded right away.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use netsweep_common::network::mac::{OUI_LEN, normalize_oui};
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::vendors::VendorRegistry;

pub const DEFAULT_OUI_URL: &str = "https://standards-oui.ieee.org/oui/oui.csv";

const USER_AGENT: &str = concat!("netsweep/", env!("CARGO_PKG_VERSION"), " (+local)");
const FETCH_TIMEOUT: Duration = Duration::from_secs(45);

const OUTPUT_HEADER: [&str; 2] = ["OUI", "OrganizationName"];
const KEY_COLUMNS: [&str; 3] = ["assignment", "assignment address", "hex"];

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("download OUI list")]
    RemoteFetch(#[from] reqwest::Error),

    #[error("unexpected status from registry: {0}")]
    RemoteStatus(StatusCode),

    #[error("source registry is empty")]
    EmptySource,

    #[error("sanitize OUI list")]
    Sanitize(#[from] csv::Error),

    #[error("replace {}", path.display())]
    AtomicReplace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome of a completed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Rows written to the new file.
    pub rows: usize,
    /// Whether the registry now serves the new file.
    pub reloaded: bool,
}

pub struct OuiUpdater {
    client: reqwest::Client,
    url: String,
}

impl OuiUpdater {
    pub fn new() -> Result<Self, UpdateError> {
        Self::with_url(DEFAULT_OUI_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the registry, installs it at `dest` and hot-reloads
    /// `registry` if it reads from `dest`.
    pub async fn update(
        &self,
        dest: &Path,
        registry: &VendorRegistry,
    ) -> Result<UpdateSummary, UpdateError> {
        info!(url = %self.url, "downloading OUI registry");
        let response = self.client.get(&self.url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(UpdateError::RemoteStatus(response.status()));
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "OUI registry downloaded");

        let rows = install(body.as_ref(), dest)?;
        info!(path = %dest.display(), rows, "OUI database written");

        let reloaded = reload_if_served(dest, registry);
        Ok(UpdateSummary { rows, reloaded })
    }
}

/// Sanitizes `src` into a temporary file next to `dest`, then renames it
/// over `dest`. Readers of `dest` see the old file or the new one.
pub fn install<R: Read>(src: R, dest: &Path) -> Result<usize, UpdateError> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    let rows = {
        let mut out = BufWriter::new(tmp.as_file_mut());
        let rows = sanitize(src, &mut out)?;
        out.flush()?;
        rows
    };
    tmp.as_file().sync_all()?;

    tmp.persist(dest).map_err(|e| UpdateError::AtomicReplace {
        path: dest.to_path_buf(),
        source: e.error,
    })?;
    Ok(rows)
}

/// Rewrites an IEEE-style CSV into `OUI,OrganizationName` rows.
///
/// The key column is found by name (`Assignment`, `Assignment Address` or
/// `Hex`) and defaults to the first column; the organization column is the
/// first whose name starts with `organization` and defaults to the second.
/// Rows that are too short, have empty fields or whose key does not
/// normalize to six hex digits are dropped.
pub fn sanitize<R: Read, W: Write>(src: R, dst: W) -> Result<usize, UpdateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(src);
    let mut writer = csv::Writer::from_writer(dst);

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(UpdateError::EmptySource);
    }
    let (key_idx, org_idx) = detect_columns(&header);
    debug!(key_idx, org_idx, "source columns detected");

    writer.write_record(OUTPUT_HEADER)?;

    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        let (Some(raw_key), Some(org)) = (record.get(key_idx), record.get(org_idx)) else {
            continue;
        };
        let (raw_key, org) = (raw_key.trim(), org.trim());
        if raw_key.is_empty() || org.is_empty() {
            continue;
        }
        let oui = normalize_oui(raw_key);
        if oui.len() != OUI_LEN {
            continue;
        }
        writer.write_record([oui.as_str(), org])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

fn detect_columns(header: &csv::StringRecord) -> (usize, usize) {
    let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let key = names
        .iter()
        .position(|n| KEY_COLUMNS.contains(&n.as_str()))
        .unwrap_or(0);
    let org = names
        .iter()
        .position(|n| n.starts_with("organization"))
        .unwrap_or(1);
    (key, org)
}

/// Reloads `registry` when `dest` is the file it serves from. A failed
/// reload is logged and reported as `false`.
pub fn reload_if_served(dest: &Path, registry: &VendorRegistry) -> bool {
    if !same_location(dest, registry.path()) {
        debug!(
            dest = %dest.display(),
            registry = %registry.path().display(),
            "updated file is not the served database"
        );
        return false;
    }
    match registry.reload() {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "failed to hot-reload OUI database");
            false
        }
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
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

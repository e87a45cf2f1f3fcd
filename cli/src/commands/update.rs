use std::time::Instant;

use anyhow::Context;
use colored::*;
use netsweep_common::Config;
use netsweep_core::VendorRegistry;
use netsweep_core::update::OuiUpdater;

use crate::terminal::{print, spinner};

pub async fn update_oui(cfg: &Config, registry: &VendorRegistry, url: Option<String>) -> anyhow::Result<()> {
    let updater = match url {
        Some(url) => OuiUpdater::with_url(url),
        None => OuiUpdater::new(),
    }
    .context("building HTTP client")?;

    let start = Instant::now();
    let summary = {
        let _spinner = spinner::start(&format!("Downloading {}", updater.url()));
        updater
            .update(&cfg.oui_path, registry)
            .await
            .with_context(|| format!("updating {}", cfg.oui_path.display()))?
    };

    print::print_status(format!(
        "Wrote {} entries to {} in {}",
        summary.rows.to_string().green().bold(),
        cfg.oui_path.display(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).yellow()
    ));
    if summary.reloaded {
        print::print_status("OUI database updated successfully");
    }
    Ok(())
}

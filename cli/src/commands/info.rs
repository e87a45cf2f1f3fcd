use anyhow::Context;
use colored::*;
use is_root::is_root;
use netsweep_common::Config;
use netsweep_common::network::interface::InterfaceInfo;
use netsweep_core::VendorRegistry;
use netsweep_core::discovery;

use crate::terminal::print::{self, GLOBAL_KEY_WIDTH};
use crate::terminal::{colors, format};

pub fn info(cfg: &Config, registry: &VendorRegistry) -> anyhow::Result<()> {
    let interface: InterfaceInfo =
        discovery::resolve_interface(cfg).context("resolving scan interface")?;

    GLOBAL_KEY_WIDTH.set(12);
    print_interface(&interface, cfg);
    print_oui_database(registry);
    print_privileges();
    print::end_of_program();
    Ok(())
}

fn print_interface(interface: &InterfaceInfo, cfg: &Config) {
    print::header("network interface");
    print::aligned_line("Interface", interface.interface_name.color(colors::PRIMARY));
    print::aligned_line("IPv4", interface.address.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Network", format::cidr(&interface.subnet));
    if let Some(subnet) = &cfg.subnet {
        print::aligned_line("Scan target", format::cidr(subnet));
    }
}

fn print_oui_database(registry: &VendorRegistry) {
    print::header("oui database");
    print::aligned_line("Path", registry.path().display().to_string());
    let entries = registry.len();
    let value = if entries == 0 {
        "empty (run update-oui)".yellow()
    } else {
        entries.to_string().green()
    };
    print::aligned_line("Entries", value);
}

fn print_privileges() {
    let value = if is_root() {
        "root".green()
    } else {
        "unprivileged".red()
    };
    print::aligned_line("Privileges", value);
}

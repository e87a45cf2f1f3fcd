pub mod discover;
pub mod info;
pub mod serve;
pub mod update;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use netsweep_common::Config;
use netsweep_common::config::DEFAULT_OUI_PATH;

#[derive(Parser)]
#[command(name = "netsweep")]
#[command(version, about = "ARP host discovery for the local network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// OUI database (OUI,OrganizationName CSV)
    #[arg(long, global = true, env = "NETSWEEP_OUI_PATH", default_value = DEFAULT_OUI_PATH)]
    pub oui_path: PathBuf,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the interface a scan would use
    #[command(alias = "i")]
    Info {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Discover hosts on the local network
    #[command(alias = "d")]
    Discover {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Download the IEEE registry and refresh the OUI database
    #[command(alias = "u")]
    UpdateOui {
        /// Registry to download instead of the IEEE MA-L list
        #[arg(long)]
        url: Option<String>,
    },
    /// Expose info, scan and OUI update over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Scan through this interface instead of the default one
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Scan this CIDR instead of the interface's own network
    #[arg(short, long)]
    pub subnet: Option<String>,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Seconds to listen for replies after all requests are sent
    #[arg(short = 'w', long, default_value = "2", value_parser = parse_wait)]
    pub wait: Duration,

    /// Skip reverse DNS lookups
    #[arg(long)]
    pub no_dns: bool,

    /// Milliseconds allowed per reverse lookup
    #[arg(long, default_value_t = 500)]
    pub dns_timeout: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut cfg = Config {
            oui_path: self.oui_path.clone(),
            ..Config::default()
        };
        match &self.command {
            Commands::Info { target } => target.apply(&mut cfg),
            Commands::Discover { target, scan } | Commands::Serve { target, scan, .. } => {
                target.apply(&mut cfg);
                scan.apply(&mut cfg);
            }
            Commands::UpdateOui { .. } => {}
        }
        cfg
    }
}

impl TargetArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.interface = self.interface.clone();
        cfg.subnet = self.subnet.clone();
    }
}

impl ScanArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.listen_window = self.wait;
        cfg.no_dns = self.no_dns;
        cfg.hostname_timeout = Duration::from_millis(self.dns_timeout);
    }
}

/// Seconds as a non-negative decimal, e.g. `2` or `0.5`.
fn parse_wait(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("`{raw}` is not a usable listening window"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUI_PATH: &str = "data/oui.csv";
pub const DEFAULT_LISTEN_WINDOW: Duration = Duration::from_secs(2);
pub const DEFAULT_HOSTNAME_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the canonical `OUI,OrganizationName` CSV.
    pub oui_path: PathBuf,

    /// How long the scanner listens for replies once every probe is out.
    pub listen_window: Duration,

    /// Disables reverse lookups of responding hosts.
    ///
    /// Does not change which hosts are reported.
    pub no_dns: bool,

    /// Upper bound for a single reverse lookup.
    pub hostname_timeout: Duration,

    /// Scan through this interface instead of the detected default.
    pub interface: Option<String>,

    /// Scan this CIDR instead of the interface's own network.
    pub subnet: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oui_path: PathBuf::from(DEFAULT_OUI_PATH),
            listen_window: DEFAULT_LISTEN_WINDOW,
            no_dns: false,
            hostname_timeout: DEFAULT_HOSTNAME_TIMEOUT,
            interface: None,
            subnet: None,
        }
    }
}

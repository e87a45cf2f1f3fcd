mod commands;
mod terminal;

use std::sync::Arc;

use commands::{CommandLine, Commands, discover, info, serve, update};
use netsweep_core::VendorRegistry;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose);

    let cfg = commands.config();
    let registry = Arc::new(VendorRegistry::new(cfg.oui_path.clone()));

    match commands.command {
        Commands::Info { .. } => {
            print::header("about this host");
            info::info(&cfg, &registry)
        }
        Commands::Discover { .. } => {
            print::header("getting ready for discovery");
            discover::discover(&cfg, registry).await
        }
        Commands::UpdateOui { url } => {
            print::header("updating oui database");
            update::update_oui(&cfg, &registry, url).await
        }
        Commands::Serve { bind, .. } => {
            print::header("starting http server");
            let state = serve::AppState {
                cfg: Arc::new(cfg),
                registry,
                oui_url: None,
            };
            serve::serve(bind, state).await
        }
    }
}

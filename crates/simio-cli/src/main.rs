mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use simio::engine::registry::FileRegistry;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("simio CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config = config::load_config(cli.config.as_deref())?;
    let registry = FileRegistry::new(config);

    let command_result = match cli.command {
        Commands::Inspect(args) => {
            info!("Dispatching to 'inspect' command.");
            commands::inspect::run(args, &registry)
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::convert::run(args, &registry)
        }
    };

    match &command_result {
        Ok(_) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    command_result
}

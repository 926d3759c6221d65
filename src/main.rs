//! Sortnet CLI - optimal sorting network search
//!
//! Command-line interface for the sortnet library.

use clap::Parser;
use env_logger::Env;
use log::info;

use sortnet::cli::{self, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Sortnet v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Sortnet v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Search {
            network,
            config,
            workers,
            time_limit,
            presolve,
            log_search,
            export_model,
            json,
        } => {
            let export = export_model.as_deref();
            match config {
                Some(path) => cli::commands::search_from_file(&path, export, json)?,
                None => {
                    let config =
                        cli::search_config(&network, workers, time_limit, presolve, log_search);
                    cli::commands::search(&config, export, json)?
                }
            }
        }
        Commands::ExportModel { network, output } => {
            cli::commands::export_model(&network.params(), &output)?
        }
    }
    Ok(())
}

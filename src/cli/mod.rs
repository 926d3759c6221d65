//! CLI Module
//!
//! Command-line interface for the sorting network search.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{NetworkParams, Objective, SearchConfig};
use crate::engine::EngineParams;

/// Sortnet - optimal sorting network search via SAT
#[derive(Parser, Debug)]
#[command(name = "sortnet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Instance shape shared by the subcommands
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Number of channels
    #[arg(short = 'n', long, default_value_t = 4)]
    pub channels: usize,

    /// Maximum number of comparator layers
    #[arg(short, long, default_value_t = 4)]
    pub depth: usize,

    /// Optimization target
    #[arg(short, long, value_enum, default_value_t = Objective::MinimizeDepth)]
    pub objective: Objective,
}

impl NetworkArgs {
    pub fn params(&self) -> NetworkParams {
        NetworkParams::new(self.channels, self.depth, self.objective)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for an optimal network and validate it
    #[command(name = "search")]
    Search {
        #[command(flatten)]
        network: NetworkArgs,

        /// Load the whole configuration from a JSON file instead of flags
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Requested solver worker threads (0 = engine default)
        #[arg(long, default_value_t = 0)]
        workers: usize,

        /// Wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,

        /// Simplify the clause set before solving
        #[arg(long)]
        presolve: bool,

        /// Log every improving solution
        #[arg(long)]
        log_search: bool,

        /// Also write the assembled model as JSON
        #[arg(long)]
        export_model: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the model and write it as JSON without solving
    #[command(name = "export-model")]
    ExportModel {
        #[command(flatten)]
        network: NetworkArgs,

        /// Output file
        #[arg(long, default_value = "model.json")]
        output: PathBuf,
    },
}

/// Settings of a `search` invocation, resolved from flags or a file
pub fn search_config(
    network: &NetworkArgs,
    workers: usize,
    time_limit: Option<f64>,
    presolve: bool,
    log_search: bool,
) -> SearchConfig {
    SearchConfig::new(
        network.params(),
        EngineParams {
            num_workers: workers,
            max_time_in_seconds: time_limit,
            presolve,
            log_search_progress: log_search,
        },
    )
}

//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::config::{NetworkParams, SearchConfig};
use crate::error::Result;
use crate::report::{render_text, SearchReport};
use crate::search::assemble;

/// Run one search and print its report.
pub fn search(config: &SearchConfig, export: Option<&Path>, json: bool) -> Result<()> {
    info!(
        "Search: {} channels, depth {}, {}",
        config.network.channels, config.network.depth, config.network.objective
    );

    let run = crate::search::search(config, export)?;

    if json {
        println!("{}", SearchReport::from_run(&run).to_json()?);
    } else {
        print!("{}", render_text(&run));
    }

    Ok(())
}

/// Load a configuration file and run the search it describes.
pub fn search_from_file(path: &Path, export: Option<&Path>, json: bool) -> Result<()> {
    info!("Loading configuration: {}", path.display());
    let config = SearchConfig::load(path)?;
    search(&config, export, json)
}

/// Build the model and write it out without solving.
pub fn export_model(params: &NetworkParams, output: &Path) -> Result<()> {
    let built = assemble(params, Some(output))?;
    println!(
        "Model written: {} ({} variables, {} constraints)",
        output.display(),
        built.model.num_vars(),
        built.model.constraints().len()
    );
    Ok(())
}

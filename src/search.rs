//! One search run: build the model, solve it once, decode, validate.

use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::config::{NetworkParams, SearchConfig};
use crate::encoder::{build_model, NetworkModel};
use crate::engine::{ConstraintEngine, SolveStats, Status, VarisatEngine};
use crate::error::Result;
use crate::network::Network;
use crate::solution::{extract_network, validate, ValidationReport};
use crate::vectors::binary_vectors;

/// A network decoded from a feasible or optimal assignment
#[derive(Debug, Clone, Serialize)]
pub struct FoundNetwork {
    pub status: Status,
    pub objective_value: Option<i64>,
    pub network: Network,
    pub validation: ValidationReport,
}

/// Every path of a run ends in one of these.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(FoundNetwork),
    NoNetwork { status: Status },
}

impl SearchOutcome {
    pub fn status(&self) -> Status {
        match self {
            SearchOutcome::Found(found) => found.status,
            SearchOutcome::NoNetwork { status } => *status,
        }
    }

    pub fn network(&self) -> Option<&Network> {
        match self {
            SearchOutcome::Found(found) => Some(&found.network),
            SearchOutcome::NoNetwork { .. } => None,
        }
    }
}

/// Outcome plus what the engine reported about itself
#[derive(Debug, Clone)]
pub struct SearchRun {
    pub params: NetworkParams,
    pub outcome: SearchOutcome,
    pub stats: SolveStats,
}

/// Assemble the model for `params`, optionally writing it out as JSON.
pub fn assemble(params: &NetworkParams, export: Option<&Path>) -> Result<NetworkModel> {
    params.validate()?;
    let vectors = binary_vectors(params.channels);
    let built = build_model(params, &vectors);
    if let Some(path) = export {
        built.model.export_json(path)?;
        info!("model written to {}", path.display());
    }
    Ok(built)
}

/// Run a search with the varisat backend configured from `config`,
/// optionally writing the assembled model to `export`.
pub fn search(config: &SearchConfig, export: Option<&Path>) -> Result<SearchRun> {
    config.validate()?;
    search_with(
        &config.network,
        &VarisatEngine::new(config.engine.clone()),
        export,
    )
}

/// Run a search with any engine. The engine is called exactly once.
pub fn search_with<E: ConstraintEngine>(
    params: &NetworkParams,
    engine: &E,
    export: Option<&Path>,
) -> Result<SearchRun> {
    info!(
        "searching {}-channel networks, depth <= {}, {} ({} backend)",
        params.channels,
        params.depth,
        params.objective,
        engine.name()
    );

    let built = assemble(params, export)?;
    let response = engine.solve(&built.model);
    let status = response.status();
    info!("Status = {}", status);

    let outcome = if status.has_solution() {
        let network = extract_network(&response, &built.layout);
        let validation = validate(&network, &binary_vectors(params.channels));
        if !validation.is_valid() {
            warn!(
                "decoded network fails {} of {} vectors; the encoding is inconsistent",
                validation.failures.len(),
                validation.checked
            );
        }
        SearchOutcome::Found(FoundNetwork {
            status,
            objective_value: response.objective_value(),
            network,
            validation,
        })
    } else {
        SearchOutcome::NoNetwork { status }
    };

    Ok(SearchRun {
        params: *params,
        outcome,
        stats: response.stats().clone(),
    })
}

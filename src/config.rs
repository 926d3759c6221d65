//! Search configuration
//!
//! Everything a run needs is carried in one immutable [`SearchConfig`]:
//! the instance shape ([`NetworkParams`]) and the opaque engine knobs
//! ([`EngineParams`]). It can be built in code, from CLI flags, or loaded
//! from a JSON file.

use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::engine::EngineParams;
use crate::error::{Result, SortnetError};

/// Upper bound on channels; the model holds one copy of the value
/// propagation per 0/1 vector, i.e. 2^n of them.
pub const MAX_CHANNELS: usize = 20;

/// What the solver minimizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Objective {
    /// Number of non-empty comparator layers
    #[default]
    #[value(alias = "depth")]
    MinimizeDepth,
    /// Total number of comparators over all layers
    #[value(alias = "comparators")]
    MinimizeTotalComparators,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::MinimizeDepth => write!(f, "MINIMIZE_DEPTH"),
            Objective::MinimizeTotalComparators => write!(f, "MINIMIZE_TOTAL_COMPARATORS"),
        }
    }
}

/// Shape of the network being searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Number of channels (wires)
    pub channels: usize,
    /// Maximum number of comparator layers
    pub depth: usize,
    /// Optimization target
    #[serde(default)]
    pub objective: Objective,
}

impl NetworkParams {
    pub fn new(channels: usize, depth: usize, objective: Objective) -> Self {
        Self {
            channels,
            depth,
            objective,
        }
    }

    /// Layer slots in the model: layer 0 is the input, 1..=depth hold comparators.
    pub fn layers(&self) -> usize {
        self.depth + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(SortnetError::InvalidConfig {
                reason: "channels must be at least 1".to_string(),
            });
        }
        if self.channels > MAX_CHANNELS {
            return Err(SortnetError::TooManyChannels {
                channels: self.channels,
                max: MAX_CHANNELS,
            });
        }
        Ok(())
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::new(4, 4, Objective::MinimizeDepth)
    }
}

/// Complete configuration for one search run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub network: NetworkParams,
    #[serde(default)]
    pub engine: EngineParams,
}

impl SearchConfig {
    pub fn new(network: NetworkParams, engine: EngineParams) -> Self {
        Self { network, engine }
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SortnetError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| SortnetError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: SearchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| SortnetError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        if let Some(secs) = self.engine.max_time_in_seconds {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(SortnetError::InvalidConfig {
                    reason: format!("time limit must be a positive number of seconds, got {}", secs),
                });
            }
        }
        Ok(())
    }
}

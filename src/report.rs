//! Console and JSON reporting of a search run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Objective;
use crate::engine::{SolveStats, Status};
use crate::search::{SearchOutcome, SearchRun};

/// Serializable summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub channels: usize,
    pub depth: usize,
    pub objective: Objective,
    pub status: Status,
    pub result: SearchOutcome,
    pub stats: SolveStats,
    pub generated_at: DateTime<Utc>,
}

impl SearchReport {
    pub fn from_run(run: &SearchRun) -> Self {
        Self {
            channels: run.params.channels,
            depth: run.params.depth,
            objective: run.params.objective,
            status: run.outcome.status(),
            result: run.outcome.clone(),
            stats: run.stats.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Human-readable report: status, echoed parameters, one line per layer,
/// and the validation banners with one error line per failing vector.
pub fn render_text(run: &SearchRun) -> String {
    run.to_string()
}

impl fmt::Display for SearchRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status = {}", self.outcome.status())?;

        let SearchOutcome::Found(found) = &self.outcome else {
            return Ok(());
        };

        writeln!(f, "Channel Size = {}", self.params.channels)?;
        writeln!(f, "Original Depth = {}", self.params.depth)?;
        match found.objective_value {
            Some(value) => writeln!(
                f,
                "Obj_Type = {}, Obj_Val = {}",
                self.params.objective, value
            )?,
            None => writeln!(f, "Obj_Type = {}", self.params.objective)?,
        }
        write!(f, "{}", found.network)?;

        writeln!(f, "Validation Started")?;
        for failure in &found.validation.failures {
            writeln!(
                f,
                "Error: vector #{} {:?} -> {:?} is not sorted",
                failure.vector_id, failure.input, failure.output
            )?;
        }
        writeln!(f, "Validation Finished")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkParams;
    use crate::network::{Comparator, Network};
    use crate::search::FoundNetwork;
    use crate::solution::{ValidationFailure, ValidationReport};
    use pretty_assertions::assert_eq;

    fn found_run(validation: ValidationReport) -> SearchRun {
        let mut network = Network::new(2);
        network.push_layer(vec![Comparator::new(0, 1)]);
        SearchRun {
            params: NetworkParams::new(2, 1, Objective::MinimizeDepth),
            outcome: SearchOutcome::Found(FoundNetwork {
                status: Status::Optimal,
                objective_value: Some(1),
                network,
                validation,
            }),
            stats: SolveStats::default(),
        }
    }

    #[test]
    fn test_render_found() {
        let run = found_run(ValidationReport {
            checked: 4,
            failures: Vec::new(),
        });
        assert_eq!(
            render_text(&run),
            "Status = Optimal\n\
             Channel Size = 2\n\
             Original Depth = 1\n\
             Obj_Type = MINIMIZE_DEPTH, Obj_Val = 1\n\
             Depth: 1, Index: [(0, 1)]\n\
             Validation Started\n\
             Validation Finished\n"
        );
    }

    #[test]
    fn test_render_validation_errors() {
        let run = found_run(ValidationReport {
            checked: 4,
            failures: vec![ValidationFailure {
                vector_id: 1,
                input: vec![1, 0],
                output: vec![1, 0],
            }],
        });
        let text = render_text(&run);
        assert_eq!(text, format!("{}", run));
        assert!(text.contains("Error: vector #1 [1, 0] -> [1, 0] is not sorted\n"));
        assert!(text.ends_with("Validation Finished\n"));
    }

    #[test]
    fn test_render_no_network() {
        let run = SearchRun {
            params: NetworkParams::new(3, 2, Objective::MinimizeDepth),
            outcome: SearchOutcome::NoNetwork {
                status: Status::Infeasible,
            },
            stats: SolveStats::default(),
        };
        assert_eq!(render_text(&run), "Status = Infeasible\n");
    }

    #[test]
    fn test_json_report() {
        let run = found_run(ValidationReport::default());
        let json: serde_json::Value =
            serde_json::from_str(&SearchReport::from_run(&run).to_json().unwrap()).unwrap();

        assert_eq!(json["status"], "Optimal");
        assert_eq!(json["objective"], "MINIMIZE_DEPTH");
        assert_eq!(json["result"]["outcome"], "found");
        assert_eq!(json["result"]["network"]["layers"][0][0]["high"], 1);
    }
}

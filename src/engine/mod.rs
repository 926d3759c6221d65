//! Constraint engine
//!
//! The search core only talks to the [`ConstraintEngine`] trait: it hands
//! over an assembled [`CpModel`] and reads back a [`SolveResponse`]. The
//! shipped backend, [`VarisatEngine`], lowers the model to CNF and drives
//! the `varisat` SAT solver.

mod cnf;
mod model;
mod presolve;
mod sat;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use model::{BoolVar, Comparison, Constraint, CpModel, LinearExpr, Literal};
pub use presolve::PresolveStats;
pub use sat::VarisatEngine;

/// Engine knobs, passed through without interpretation by the search core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Requested worker threads (0 = engine default)
    pub num_workers: usize,
    /// Wall-clock budget in seconds for the whole solve call
    pub max_time_in_seconds: Option<f64>,
    /// Simplify the clause set before solving
    pub presolve: bool,
    /// Log every improving solution at info level
    pub log_search_progress: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            num_workers: 0,
            max_time_in_seconds: None,
            presolve: false,
            log_search_progress: false,
        }
    }
}

impl EngineParams {
    /// The budget as a duration; negative or non-finite values mean none.
    pub fn time_limit(&self) -> Option<Duration> {
        self.max_time_in_seconds
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Verdict of a solve call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Unknown,
    ModelInvalid,
    Feasible,
    Infeasible,
    Optimal,
}

impl Status {
    /// Feasible and Optimal carry an assignment; the others do not.
    pub fn has_solution(self) -> bool {
        matches!(self, Status::Feasible | Status::Optimal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Unknown => "Unknown",
            Status::ModelInvalid => "Model_Invalid",
            Status::Feasible => "Feasible",
            Status::Infeasible => "Infeasible",
            Status::Optimal => "Optimal",
        };
        f.write_str(name)
    }
}

/// Counters collected during one solve call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolveStats {
    pub model_vars: usize,
    pub cnf_vars: usize,
    pub clauses: usize,
    pub sat_calls: usize,
    pub wall_time_secs: f64,
    /// Present when presolve ran
    pub presolve: Option<PresolveStats>,
}

/// Result of a solve call: status, objective, and the assignment of every
/// model variable when a solution was found.
#[derive(Debug, Clone)]
pub struct SolveResponse {
    status: Status,
    objective_value: Option<i64>,
    values: Vec<bool>,
    stats: SolveStats,
}

impl SolveResponse {
    pub fn new(
        status: Status,
        objective_value: Option<i64>,
        values: Vec<bool>,
        stats: SolveStats,
    ) -> Self {
        Self {
            status,
            objective_value,
            values,
            stats,
        }
    }

    /// A response without an assignment.
    pub fn without_solution(status: Status, stats: SolveStats) -> Self {
        Self::new(status, None, Vec::new(), stats)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn objective_value(&self) -> Option<i64> {
        self.objective_value
    }

    /// Value of a literal in the returned assignment. Always false when
    /// there is no solution.
    pub fn value(&self, literal: impl Into<Literal>) -> bool {
        let literal = literal.into();
        self.values
            .get(literal.var.index())
            .map_or(false, |&v| v != literal.negated)
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }
}

/// Anything that can decide a [`CpModel`]
pub trait ConstraintEngine {
    /// Solve the model in one blocking call.
    fn solve(&self, model: &CpModel) -> SolveResponse;

    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::ModelInvalid.to_string(), "Model_Invalid");
        assert_eq!(Status::Optimal.to_string(), "Optimal");
        assert!(Status::Feasible.has_solution());
        assert!(!Status::Unknown.has_solution());
        assert!(!Status::Infeasible.has_solution());
    }

    #[test]
    fn test_response_value_lookup() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let response =
            SolveResponse::new(Status::Optimal, None, vec![true, false], SolveStats::default());

        assert!(response.value(a));
        assert!(!response.value(b));
        assert!(response.value(!b));

        let empty = SolveResponse::without_solution(Status::Infeasible, SolveStats::default());
        assert!(!empty.value(a));
    }

    #[test]
    fn test_time_limit_conversion() {
        let params = EngineParams {
            max_time_in_seconds: Some(1.5),
            ..EngineParams::default()
        };
        assert_eq!(params.time_limit(), Some(Duration::from_millis(1500)));
        assert_eq!(EngineParams::default().time_limit(), None);

        let negative = EngineParams {
            max_time_in_seconds: Some(-1.0),
            ..EngineParams::default()
        };
        assert_eq!(negative.time_limit(), None);
    }
}

//! Decoding and independent validation
//!
//! The decoded network is replayed directly over every test vector, without
//! the solver. A vector that comes out unsorted means the encoding is wrong,
//! which is a different thing from the instance being infeasible.

use log::{error, info};
use serde::Serialize;

use crate::encoder::LayoutVars;
use crate::engine::SolveResponse;
use crate::network::{Comparator, Network};
use crate::vectors::{is_sorted, TestVector};

/// Read the comparator layers out of a solved assignment, dropping layers
/// that hold no comparator.
pub fn extract_network(response: &SolveResponse, layout: &LayoutVars) -> Network {
    let n = layout.channels();
    let mut network = Network::new(n);
    for k in 0..layout.layers() {
        let mut layer = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                if response.value(layout.comparator(i, j, k)) {
                    layer.push(Comparator::new(i, j));
                }
            }
        }
        network.push_layer(layer);
    }
    network
}

/// A test vector the decoded network failed to sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub vector_id: usize,
    pub input: TestVector,
    pub output: TestVector,
}

/// Outcome of replaying every test vector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replay `network` over every vector; every failure is recorded and the
/// remaining vectors are still checked.
pub fn validate(network: &Network, vectors: &[TestVector]) -> ValidationReport {
    info!("Validation Started");
    let mut report = ValidationReport::default();

    for (vector_id, input) in vectors.iter().enumerate() {
        let output = network.run(input);
        report.checked += 1;
        if !is_sorted(&output) {
            error!(
                "vector #{} {:?} -> {:?} is not sorted",
                vector_id, input, output
            );
            report.failures.push(ValidationFailure {
                vector_id,
                input: input.clone(),
                output,
            });
        }
    }

    info!(
        "Validation Finished: {} vectors, {} failures",
        report.checked,
        report.failures.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NetworkParams, Objective};
    use crate::encoder::build_model;
    use crate::engine::{SolveStats, Status};
    use crate::vectors::binary_vectors;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_drops_empty_layers() {
        let params = NetworkParams::new(3, 3, Objective::MinimizeDepth);
        let built = build_model(&params, &binary_vectors(3));

        let mut values = vec![false; built.model.num_vars()];
        let layout = &built.layout;
        for (i, j, k) in [(0, 2, 1), (0, 1, 3), (1, 2, 2)] {
            values[layout.comparator(i, j, k).index()] = true;
            values[layout.comparator(j, i, k).index()] = true;
        }
        let response = SolveResponse::new(Status::Feasible, None, values, SolveStats::default());

        let network = extract_network(&response, layout);
        assert_eq!(
            network.layers(),
            &[
                vec![Comparator::new(0, 2)],
                vec![Comparator::new(1, 2)],
                vec![Comparator::new(0, 1)],
            ]
        );
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let mut network = Network::new(3);
        network.push_layer(vec![Comparator::new(0, 1)]);

        let report = validate(&network, &binary_vectors(3));
        assert_eq!(report.checked, 8);
        assert!(!report.is_valid());

        let failing: Vec<usize> = report.failures.iter().map(|f| f.vector_id).collect();
        // [1,0,0] -> [0,1,0], [0,1,0], [1,1,0]
        assert_eq!(failing, vec![1, 2, 3]);
        assert_eq!(report.failures[0].output, vec![0, 1, 0]);
    }

    #[test]
    fn test_validate_two_channel_scenario() {
        let mut network = Network::new(2);
        network.push_layer(vec![Comparator::new(0, 1)]);

        let vectors = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
        let outputs: Vec<_> = vectors.iter().map(|v| network.run(v)).collect();
        assert_eq!(outputs, vec![vec![0, 0], vec![0, 1], vec![0, 1], vec![1, 1]]);
        assert!(validate(&network, &vectors).is_valid());
    }
}

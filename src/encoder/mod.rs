//! Sorting-network existence as a boolean constraint model
//!
//! One layout (shared) plus one value propagation per 0/1 vector. A model
//! solution is a network that sorts every vector, hence every input.

mod layout;
mod propagation;

use log::debug;

pub use layout::{encode_layout, LayoutVars};
pub use propagation::{encode_vector, ValueVars};

use crate::config::NetworkParams;
use crate::engine::CpModel;
use crate::vectors::TestVector;

/// An assembled model together with the handles needed to decode it
#[derive(Debug, Clone)]
pub struct NetworkModel {
    pub model: CpModel,
    pub layout: LayoutVars,
    pub vectors: Vec<ValueVars>,
}

/// Build the complete model for `params` over the given test vectors.
pub fn build_model(params: &NetworkParams, vectors: &[TestVector]) -> NetworkModel {
    let mut model = CpModel::new();
    let layout = encode_layout(&mut model, params);
    let vectors = vectors
        .iter()
        .enumerate()
        .map(|(id, vector)| encode_vector(&mut model, &layout, vector, id))
        .collect();

    debug!(
        "model for {} channels, depth {}: {} variables, {} constraints",
        params.channels,
        params.depth,
        model.num_vars(),
        model.constraints().len()
    );

    NetworkModel {
        model,
        layout,
        vectors,
    }
}

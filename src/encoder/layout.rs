//! Comparator layout variables
//!
//! `L[i,j,k]` is true iff channels `i` and `j` share a comparator in layer
//! `k`. The matrix is declared in full (both triangles, the diagonal, and
//! layer 0) and pinned down by constraints, so every slot has a variable.

use crate::config::{NetworkParams, Objective};
use crate::engine::{BoolVar, CpModel, LinearExpr};

/// Dense arena of the layout variables shared by every test vector
#[derive(Debug, Clone)]
pub struct LayoutVars {
    channels: usize,
    layers: usize,
    comparators: Vec<BoolVar>,
    /// `active[k - 1]` for `k in 1..layers`
    active: Vec<BoolVar>,
}

impl LayoutVars {
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    fn slot(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.channels && j < self.channels && k < self.layers);
        (k * self.channels + i) * self.channels + j
    }

    /// `L[i,j,k]`
    pub fn comparator(&self, i: usize, j: usize, k: usize) -> BoolVar {
        self.comparators[self.slot(i, j, k)]
    }

    /// `active[k]`, defined for `k >= 1`
    pub fn active(&self, k: usize) -> BoolVar {
        assert!(k >= 1, "layer 0 has no active flag");
        self.active[k - 1]
    }

    /// `L[i,0,k] .. L[i,n-1,k]`: every potential partner of channel `i`
    pub fn row(&self, i: usize, k: usize) -> impl Iterator<Item = BoolVar> + '_ {
        (0..self.channels).map(move |j| self.comparator(i, j, k))
    }

    /// `L[i,j,k]` for `i < j`: one variable per physical comparator slot
    pub fn upper(&self, k: usize) -> impl Iterator<Item = BoolVar> + '_ {
        (0..self.channels)
            .flat_map(move |i| (i + 1..self.channels).map(move |j| self.comparator(i, j, k)))
    }
}

/// Declare the layout variables, their structural constraints and the
/// objective.
pub fn encode_layout(model: &mut CpModel, params: &NetworkParams) -> LayoutVars {
    let n = params.channels;
    let d = params.layers();

    let mut comparators = Vec::with_capacity(n * n * d);
    for k in 0..d {
        for i in 0..n {
            for j in 0..n {
                comparators.push(model.new_bool_var(format!("L[{},{},{}]", i, j, k)));
            }
        }
    }
    let active = (1..d)
        .map(|k| model.new_bool_var(format!("active[{}]", k)))
        .collect();
    let layout = LayoutVars {
        channels: n,
        layers: d,
        comparators,
        active,
    };

    for k in 0..d {
        for i in 0..n {
            for j in 0..n {
                let l = layout.comparator(i, j, k);
                model.add_equality(l, layout.comparator(j, i, k));
                if i == j || k == 0 {
                    model.add_equality(l, LinearExpr::constant(0));
                }
            }
        }
    }

    // a channel meets at most one comparator per layer
    for k in 0..d {
        for i in 0..n {
            model.add_less_or_equal(LinearExpr::sum(layout.row(i, k)), LinearExpr::constant(1));
        }
    }

    for k in 1..d {
        let active = layout.active(k);
        let layer = LinearExpr::sum(layout.upper(k));
        model
            .add_greater_or_equal(layer.clone(), LinearExpr::constant(1))
            .only_enforce_if(&[active.lit()]);
        model
            .add_equality(layer, LinearExpr::constant(0))
            .only_enforce_if(&[!active]);
    }

    match params.objective {
        Objective::MinimizeDepth => model.minimize(LinearExpr::sum(layout.active.iter().copied())),
        Objective::MinimizeTotalComparators => {
            model.minimize(LinearExpr::sum((0..d).flat_map(|k| layout.upper(k))))
        }
    }

    layout
}

//! Value propagation for one 0/1 test vector
//!
//! `V[i,k]` is the value on channel `i` after layer `k`. Layer 0 holds the
//! vector itself; each later layer either keeps the previous value (idle
//! channel) or applies the compare-and-swap selected by the shared layout.
//! The lower channel of a comparator always receives the minimum, the
//! higher one the maximum. The two endpoints are pinned by two independent
//! passes over the same comparator variable.

use super::layout::LayoutVars;
use crate::engine::{BoolVar, CpModel, LinearExpr};

/// Per-vector arenas: values `V[i,k]` and idle flags `idle[i,k]` (`k >= 1`)
#[derive(Debug, Clone)]
pub struct ValueVars {
    id: usize,
    channels: usize,
    layers: usize,
    values: Vec<BoolVar>,
    idle: Vec<BoolVar>,
}

impl ValueVars {
    pub fn id(&self) -> usize {
        self.id
    }

    fn slot(&self, i: usize, k: usize) -> usize {
        debug_assert!(i < self.channels && k < self.layers);
        k * self.channels + i
    }

    /// `V[i,k]`
    pub fn value(&self, i: usize, k: usize) -> BoolVar {
        self.values[self.slot(i, k)]
    }

    /// `idle[i,k]`, defined for `k >= 1`
    pub fn idle(&self, i: usize, k: usize) -> BoolVar {
        assert!(k >= 1, "layer 0 has no idle flags");
        self.idle[self.slot(i, k) - self.channels]
    }
}

/// Add the propagation constraints of `vector` (identified by `id`) and
/// require its final layer to be sorted.
pub fn encode_vector(
    model: &mut CpModel,
    layout: &LayoutVars,
    vector: &[u8],
    id: usize,
) -> ValueVars {
    let n = layout.channels();
    let d = layout.layers();
    debug_assert_eq!(vector.len(), n);

    let mut values = Vec::with_capacity(n * d);
    for k in 0..d {
        for i in 0..n {
            values.push(model.new_bool_var(format!("V[{},{},{}]", i, k, id)));
        }
    }
    let mut idle = Vec::with_capacity(n * d.saturating_sub(1));
    for k in 1..d {
        for i in 0..n {
            idle.push(model.new_bool_var(format!("idle[{},{},{}]", i, k, id)));
        }
    }
    let vars = ValueVars {
        id,
        channels: n,
        layers: d,
        values,
        idle,
    };
    let v = |i: usize, k: usize| vars.value(i, k);

    for (i, &bit) in vector.iter().enumerate() {
        model.add_equality(v(i, 0), LinearExpr::constant(i64::from(bit)));
    }

    for k in 1..d {
        for i in 0..n {
            let idle = vars.idle(i, k);
            let partners = LinearExpr::sum(layout.row(i, k));
            model
                .add_equality(partners.clone(), LinearExpr::constant(0))
                .only_enforce_if(&[idle.lit()]);
            model
                .add_greater_than(partners, LinearExpr::constant(0))
                .only_enforce_if(&[!idle]);
            model
                .add_equality(v(i, k), v(i, k - 1))
                .only_enforce_if(&[idle.lit()]);
        }
    }

    for k in 1..d {
        // lower endpoint takes the minimum
        for i in 0..n {
            for j in i + 1..n {
                let l = layout.comparator(i, j, k);
                let bt = model.new_bool_var(format!("bt_min[{},{},{},{}]", k, i, j, id));
                model
                    .add_less_or_equal(v(i, k - 1), v(j, k - 1))
                    .only_enforce_if(&[bt.lit()]);
                model
                    .add_greater_than(v(i, k - 1), v(j, k - 1))
                    .only_enforce_if(&[!bt]);
                model
                    .add_equality(v(i, k), v(i, k - 1))
                    .only_enforce_if(&[bt.lit(), l.lit()]);
                model
                    .add_equality(v(i, k), v(j, k - 1))
                    .only_enforce_if(&[!bt, l.lit()]);
            }
        }

        // higher endpoint takes the maximum, read through L[j,i,k]
        for j in 1..n {
            for i in (0..j).rev() {
                let l = layout.comparator(j, i, k);
                let bt = model.new_bool_var(format!("bt_max[{},{},{},{}]", k, i, j, id));
                model
                    .add_greater_or_equal(v(i, k - 1), v(j, k - 1))
                    .only_enforce_if(&[bt.lit()]);
                model
                    .add_less_than(v(i, k - 1), v(j, k - 1))
                    .only_enforce_if(&[!bt]);
                model
                    .add_equality(v(j, k), v(i, k - 1))
                    .only_enforce_if(&[bt.lit(), l.lit()]);
                model
                    .add_equality(v(j, k), v(j, k - 1))
                    .only_enforce_if(&[!bt, l.lit()]);
            }
        }
    }

    for i in 0..n.saturating_sub(1) {
        model.add_less_or_equal(v(i, d - 1), v(i + 1, d - 1));
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NetworkParams, Objective};
    use crate::encoder::encode_layout;

    fn encoded(vector: &[u8]) -> (CpModel, ValueVars) {
        let mut model = CpModel::new();
        let params = NetworkParams::new(vector.len(), 2, Objective::MinimizeDepth);
        let layout = encode_layout(&mut model, &params);
        let vars = encode_vector(&mut model, &layout, vector, 5);
        (model, vars)
    }

    #[test]
    fn test_variable_names() {
        let (model, vars) = encoded(&[1, 0]);
        assert_eq!(vars.id(), 5);
        assert_eq!(model.var_name(vars.value(1, 2)), Some("V[1,2,5]"));
        assert_eq!(model.var_name(vars.idle(0, 1)), Some("idle[0,1,5]"));
    }

    #[test]
    #[should_panic(expected = "layer 0 has no idle flags")]
    fn test_input_layer_has_no_idle_flags() {
        let (_, vars) = encoded(&[1, 0]);
        vars.idle(1, 0);
    }
}

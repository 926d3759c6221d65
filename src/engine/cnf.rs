//! Lowering of a [`CpModel`] to clauses
//!
//! Every constraint is normalized to `Σ lits ≤ k` over a multiset of
//! literals. Short cases become plain clauses; the rest go through a
//! totalizer whose outputs count the true inputs in unary. Enforcement
//! literals are appended, negated, to the clause that asserts the bound.

use varisat::{Lit, Var};

use super::model::{Comparison, Constraint, CpModel, LinearExpr, Literal};

/// A clause set over model variables plus auxiliary variables
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<Lit>>,
    /// An unconditional constraint is violated by every assignment.
    pub unsat: bool,
}

/// Unary view of the objective: `value = offset + #true(outputs inputs)`
#[derive(Debug, Clone, Default)]
pub struct ObjectiveCounter {
    pub offset: i64,
    pub inputs: Vec<Lit>,
    /// `outputs[c]` is implied by "at least c+1 inputs are true".
    pub outputs: Vec<Lit>,
}

pub fn to_lit(literal: Literal) -> Lit {
    Lit::from_var(Var::from_index(literal.var.index()), !literal.negated)
}

pub struct CnfEncoder {
    cnf: Cnf,
}

impl CnfEncoder {
    pub fn new(model_vars: usize) -> Self {
        Self {
            cnf: Cnf {
                num_vars: model_vars,
                ..Cnf::default()
            },
        }
    }

    /// Encode every constraint of the model; returns the clauses and the
    /// objective counter, if the model has an objective.
    pub fn encode(model: &CpModel) -> (Cnf, Option<ObjectiveCounter>) {
        let mut encoder = Self::new(model.num_vars());
        for constraint in model.constraints() {
            encoder.add_constraint(constraint);
        }
        let counter = model.objective().map(|o| encoder.objective_counter(o));
        (encoder.cnf, counter)
    }

    fn fresh(&mut self) -> Lit {
        let lit = Lit::from_index(self.cnf.num_vars, true);
        self.cnf.num_vars += 1;
        lit
    }

    fn add_clause(&mut self, mut clause: Vec<Lit>) {
        if clause.is_empty() {
            self.cnf.unsat = true;
            return;
        }
        clause.sort();
        clause.dedup();
        if clause.windows(2).any(|w| w[0] == !w[1]) {
            return;
        }
        self.cnf.clauses.push(clause);
    }

    pub fn add_constraint(&mut self, constraint: &Constraint) {
        let guard: Vec<Lit> = constraint.enforcement.iter().map(|&l| !to_lit(l)).collect();
        let expr = &constraint.expr;
        let negated = || -expr.clone();

        match constraint.cmp {
            Comparison::Le => self.at_most(expr, 0, &guard),
            Comparison::Lt => self.at_most(expr, -1, &guard),
            Comparison::Ge => self.at_most(&negated(), 0, &guard),
            Comparison::Gt => self.at_most(&negated(), -1, &guard),
            Comparison::Eq => {
                self.at_most(expr, 0, &guard);
                self.at_most(&negated(), 0, &guard);
            }
        }
    }

    /// `expr ≤ bound` under `guard` (the negated enforcement literals).
    fn at_most(&mut self, expr: &LinearExpr, bound: i64, guard: &[Lit]) {
        let (lits, offset) = unary_terms(expr);
        let k = bound - offset;
        let m = lits.len() as i64;

        if k >= m {
            return;
        }
        if k < 0 {
            self.add_clause(guard.to_vec());
            return;
        }
        if k == 0 {
            for &lit in &lits {
                self.add_clause(guarded(guard, [!lit]));
            }
            return;
        }
        if k == m - 1 {
            self.add_clause(guarded(guard, lits.iter().map(|&l| !l)));
            return;
        }

        let outputs = self.totalizer(&lits, k as usize + 1);
        self.add_clause(guarded(guard, [!outputs[k as usize]]));
    }

    /// Unary counter over `lits`, truncated to `cap` outputs.
    ///
    /// Only the upward direction is encoded: `c` true inputs force
    /// `outputs[..c]` true, nothing forces an output false.
    fn totalizer(&mut self, lits: &[Lit], cap: usize) -> Vec<Lit> {
        if lits.len() == 1 {
            return vec![lits[0]];
        }

        let mid = lits.len() / 2;
        let left = self.totalizer(&lits[..mid], cap);
        let right = self.totalizer(&lits[mid..], cap);
        let width = (left.len() + right.len()).min(cap);
        let outputs: Vec<Lit> = (0..width).map(|_| self.fresh()).collect();

        for (i, &a) in left.iter().enumerate() {
            self.add_clause(vec![!a, outputs[i]]);
        }
        for (j, &b) in right.iter().enumerate() {
            self.add_clause(vec![!b, outputs[j]]);
        }
        for (i, &a) in left.iter().enumerate() {
            for (j, &b) in right.iter().enumerate() {
                let at_least = (i + j + 1).min(width - 1);
                self.add_clause(vec![!a, !b, outputs[at_least]]);
            }
        }
        outputs
    }

    fn objective_counter(&mut self, objective: &LinearExpr) -> ObjectiveCounter {
        let (inputs, offset) = unary_terms(objective);
        let outputs = if inputs.is_empty() {
            Vec::new()
        } else {
            self.totalizer(&inputs, inputs.len())
        };
        ObjectiveCounter {
            offset,
            inputs,
            outputs,
        }
    }
}

/// Rewrite `Σ c·l + constant` as `offset + #true(lits)`, one multiset entry
/// per unit of coefficient. A negative coefficient flips the literal:
/// `c·l = |c|·¬l + c`.
fn unary_terms(expr: &LinearExpr) -> (Vec<Lit>, i64) {
    let mut lits = Vec::new();
    let mut offset = expr.constant;
    for &(literal, coeff) in &expr.terms {
        let lit = to_lit(literal);
        if coeff > 0 {
            lits.extend(std::iter::repeat(lit).take(coeff as usize));
        } else if coeff < 0 {
            lits.extend(std::iter::repeat(!lit).take(coeff.unsigned_abs() as usize));
            offset += coeff;
        }
    }
    (lits, offset)
}

fn guarded(guard: &[Lit], lits: impl IntoIterator<Item = Lit>) -> Vec<Lit> {
    guard.iter().copied().chain(lits).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustively check that the clauses, projected on the model
    /// variables, accept exactly the assignments the constraint accepts.
    fn assert_equivalent(model: &CpModel) {
        let (cnf, _) = CnfEncoder::encode(model);
        let n = model.num_vars();
        let aux = cnf.num_vars - n;
        assert!(aux <= 12, "too many auxiliaries for brute force");

        for bits in 0..1u32 << n {
            let values: Vec<bool> = (0..n).map(|i| bits >> i & 1 == 1).collect();
            let expected = model.constraints().iter().all(|c| c.is_satisfied(&values));
            let satisfiable = (0..1u32 << aux).any(|aux_bits| {
                let full: Vec<bool> = values
                    .iter()
                    .copied()
                    .chain((0..aux).map(|i| aux_bits >> i & 1 == 1))
                    .collect();
                !cnf.unsat
                    && cnf.clauses.iter().all(|clause| {
                        clause
                            .iter()
                            .any(|l| full[l.var().index()] == l.is_positive())
                    })
            });
            assert_eq!(satisfiable, expected, "assignment {:?}", values);
        }
    }

    #[test]
    fn test_at_most_one_uses_totalizer() {
        let mut model = CpModel::new();
        let xs: Vec<_> = (0..4).map(|i| model.new_bool_var(format!("x{}", i))).collect();
        model.add_less_or_equal(LinearExpr::sum(xs), LinearExpr::constant(1));
        assert_equivalent(&model);
    }

    #[test]
    fn test_reified_equality_and_strict_order() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let e = model.new_bool_var("e");
        model.add_equality(a, b).only_enforce_if(&[e.lit()]);
        model.add_greater_than(a, b).only_enforce_if(&[!e]);
        assert_equivalent(&model);
    }

    #[test]
    fn test_sum_equality_and_lower_bound() {
        let mut model = CpModel::new();
        let xs: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{}", i))).collect();
        let on = model.new_bool_var("on");
        model
            .add_greater_or_equal(LinearExpr::sum(xs.clone()), LinearExpr::constant(1))
            .only_enforce_if(&[on.lit()]);
        model
            .add_equality(LinearExpr::sum(xs), LinearExpr::constant(0))
            .only_enforce_if(&[!on]);
        assert_equivalent(&model);
    }

    #[test]
    fn test_weighted_terms() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let c = model.new_bool_var("c");
        let expr = LinearExpr::constant(0)
            .add_term(a, 2)
            .add_term(b, -1)
            .add_term(c, 1);
        model.add_less_or_equal(expr, LinearExpr::constant(1));
        assert_equivalent(&model);
    }

    #[test]
    fn test_unconditional_violation_marks_unsat() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        model.add_greater_than(a, LinearExpr::constant(1));
        let (cnf, _) = CnfEncoder::encode(&model);
        assert!(cnf.unsat);
    }

    #[test]
    fn test_objective_counter_offset() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.minimize(LinearExpr::constant(3).add_term(a, 1).add_term(b, -1));

        let (_, counter) = CnfEncoder::encode(&model);
        let counter = counter.unwrap();
        assert_eq!(counter.offset, 2);
        assert_eq!(counter.inputs.len(), 2);
        assert_eq!(counter.outputs.len(), 2);
    }
}

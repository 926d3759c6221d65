//! Boolean constraint model
//!
//! A small CP-style builder: boolean variables, linear (in)equalities over
//! weighted literals, reification through enforcement literals, and one
//! minimization objective. The model is plain data; engines read it.

use std::fs;
use std::ops::{Neg, Not, Sub};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SortnetError};

/// Handle to a boolean decision variable of one [`CpModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoolVar(u32);

impl BoolVar {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Positive literal of this variable
    pub fn lit(self) -> Literal {
        Literal {
            var: self,
            negated: false,
        }
    }
}

impl Not for BoolVar {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self,
            negated: true,
        }
    }
}

/// A variable or its negation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Literal {
    pub var: BoolVar,
    pub negated: bool,
}

impl Literal {
    /// Truth value of this literal under a variable assignment
    pub fn eval(self, values: &[bool]) -> bool {
        values[self.var.index()] != self.negated
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        var.lit()
    }
}

/// `Σ coeff·literal + constant`, each literal valued 0 or 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinearExpr {
    pub terms: Vec<(Literal, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Unweighted sum of literals
    pub fn sum<I, L>(literals: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        Self {
            terms: literals.into_iter().map(|l| (l.into(), 1)).collect(),
            constant: 0,
        }
    }

    pub fn add_term(mut self, literal: impl Into<Literal>, coeff: i64) -> Self {
        self.terms.push((literal.into(), coeff));
        self
    }

    pub fn eval(&self, values: &[bool]) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .filter(|(lit, _)| lit.eval(values))
                .map(|(_, coeff)| coeff)
                .sum::<i64>()
    }

    fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.terms.iter().map(|(lit, _)| *lit)
    }
}

impl From<BoolVar> for LinearExpr {
    fn from(var: BoolVar) -> Self {
        LinearExpr::sum([var])
    }
}

impl From<Literal> for LinearExpr {
    fn from(lit: Literal) -> Self {
        LinearExpr::sum([lit])
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        LinearExpr {
            terms: self.terms.into_iter().map(|(l, c)| (l, -c)).collect(),
            constant: -self.constant,
        }
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: LinearExpr) -> LinearExpr {
        let rhs = -rhs;
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

/// Relation between a linear expression and zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
}

/// `expr <cmp> 0`, enforced only when every enforcement literal is true
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub enforcement: Vec<Literal>,
}

impl Constraint {
    /// Reify the constraint on a conjunction of literals.
    pub fn only_enforce_if(&mut self, literals: &[Literal]) -> &mut Self {
        self.enforcement.extend_from_slice(literals);
        self
    }

    /// Check the constraint against a full assignment.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        if !self.enforcement.iter().all(|l| l.eval(values)) {
            return true;
        }
        let v = self.expr.eval(values);
        match self.cmp {
            Comparison::Eq => v == 0,
            Comparison::Le => v <= 0,
            Comparison::Ge => v >= 0,
            Comparison::Lt => v < 0,
            Comparison::Gt => v > 0,
        }
    }

    fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.expr.literals().chain(self.enforcement.iter().copied())
    }
}

/// The assembled model handed to a [`ConstraintEngine`](super::ConstraintEngine)
#[derive(Debug, Clone, Default, Serialize)]
pub struct CpModel {
    variables: Vec<String>,
    constraints: Vec<Constraint>,
    objective: Option<LinearExpr>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a boolean variable; the name is only used for debugging.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        let var = BoolVar(self.variables.len() as u32);
        self.variables.push(name.into());
        var
    }

    pub fn add_equality(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> &mut Constraint {
        self.push(lhs.into() - rhs.into(), Comparison::Eq)
    }

    pub fn add_less_or_equal(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> &mut Constraint {
        self.push(lhs.into() - rhs.into(), Comparison::Le)
    }

    pub fn add_greater_or_equal(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> &mut Constraint {
        self.push(lhs.into() - rhs.into(), Comparison::Ge)
    }

    pub fn add_less_than(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> &mut Constraint {
        self.push(lhs.into() - rhs.into(), Comparison::Lt)
    }

    pub fn add_greater_than(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> &mut Constraint {
        self.push(lhs.into() - rhs.into(), Comparison::Gt)
    }

    /// Set the objective. A later call replaces the previous one.
    pub fn minimize(&mut self, expr: impl Into<LinearExpr>) {
        self.objective = Some(expr.into());
    }

    fn push(&mut self, expr: LinearExpr, cmp: Comparison) -> &mut Constraint {
        self.constraints.push(Constraint {
            expr,
            cmp,
            enforcement: Vec::new(),
        });
        let last = self.constraints.len() - 1;
        &mut self.constraints[last]
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn var_name(&self, var: BoolVar) -> Option<&str> {
        self.variables.get(var.index()).map(String::as_str)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }

    /// Describe the first literal that refers to a variable this model
    /// never declared, if any.
    pub fn find_invalid_literal(&self) -> Option<String> {
        let objective = self.objective.iter().flat_map(|o| o.literals());
        self.constraints
            .iter()
            .flat_map(|c| c.literals())
            .chain(objective)
            .find(|lit| lit.var.index() >= self.variables.len())
            .map(|lit| {
                format!(
                    "literal on variable #{} but only {} variables are declared",
                    lit.var.index(),
                    self.variables.len()
                )
            })
    }

    /// Write the full model as pretty JSON (debugging aid).
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| SortnetError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_literal_negation() {
        let mut model = CpModel::new();
        let x = model.new_bool_var("x");
        let values = [true];

        assert!(x.lit().eval(&values));
        assert!(!(!x).eval(&values));
        assert_eq!(!!x, x.lit());
    }

    #[test]
    fn test_expression_difference() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");

        let diff = LinearExpr::from(a) - LinearExpr::from(b);
        assert_eq!(diff.eval(&[true, false]), 1);
        assert_eq!(diff.eval(&[false, true]), -1);
        assert_eq!(diff.eval(&[true, true]), 0);
    }

    #[test]
    fn test_reified_constraint_semantics() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let e = model.new_bool_var("e");
        model.add_equality(a, b).only_enforce_if(&[e.lit()]);

        let c = &model.constraints()[0];
        assert!(c.is_satisfied(&[true, false, false]));
        assert!(!c.is_satisfied(&[true, false, true]));
        assert!(c.is_satisfied(&[true, true, true]));
    }

    #[test]
    fn test_constant_comparisons() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        model.add_greater_than(LinearExpr::sum([a]), LinearExpr::constant(0));

        let c = &model.constraints()[0];
        assert!(c.is_satisfied(&[true]));
        assert!(!c.is_satisfied(&[false]));
    }

    #[test]
    fn test_find_invalid_literal() {
        let mut other = CpModel::new();
        other.new_bool_var("a");
        let foreign = other.new_bool_var("b");

        let mut model = CpModel::new();
        let x = model.new_bool_var("x");
        model.add_less_or_equal(x, LinearExpr::constant(1));
        assert!(model.find_invalid_literal().is_none());

        model.minimize(foreign);
        assert!(model.find_invalid_literal().is_some());
    }

    #[test]
    fn test_export_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut model = CpModel::new();
        let x = model.new_bool_var("L[0,1,1]");
        model.add_equality(x, LinearExpr::constant(1));
        model.minimize(x);
        model.export_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["variables"][0], "L[0,1,1]");
        assert_eq!(json["constraints"].as_array().unwrap().len(), 1);
        assert!(json["objective"].is_object());
    }
}

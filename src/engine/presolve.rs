//! Clause-level presolve
//!
//! Normalizes clauses (sorted, duplicate literals merged, tautologies
//! dropped), propagates unit clauses to a fixpoint, and removes duplicate
//! clauses. Fixed variables are kept as unit clauses so the backend still
//! reports them in its model.

use log::debug;
use serde::Serialize;
use varisat::Lit;

use super::cnf::Cnf;

/// What presolve did to the clause set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PresolveStats {
    pub fixed_vars: usize,
    pub removed_clauses: usize,
}

pub fn presolve(cnf: Cnf) -> (Cnf, PresolveStats) {
    let before = cnf.clauses.len();
    let mut assignment: Vec<Option<bool>> = vec![None; cnf.num_vars];

    let mut clauses: Vec<Vec<Lit>> = cnf
        .clauses
        .into_iter()
        .filter_map(|mut clause| {
            clause.sort();
            clause.dedup();
            let tautology = clause.windows(2).any(|w| w[0] == !w[1]);
            (!tautology).then_some(clause)
        })
        .collect();

    let mut unsat = cnf.unsat;
    let mut changed = true;
    while changed && !unsat {
        changed = false;
        let mut remaining = Vec::with_capacity(clauses.len());

        for clause in clauses {
            if clause
                .iter()
                .any(|l| assignment[l.var().index()] == Some(l.is_positive()))
            {
                continue;
            }
            let open: Vec<Lit> = clause
                .into_iter()
                .filter(|l| assignment[l.var().index()].is_none())
                .collect();

            match open.len() {
                0 => {
                    unsat = true;
                    break;
                }
                1 => {
                    assignment[open[0].var().index()] = Some(open[0].is_positive());
                    changed = true;
                }
                _ => remaining.push(open),
            }
        }
        clauses = remaining;
    }

    if unsat {
        debug!("presolve: conflict found during unit propagation");
        return (
            Cnf {
                num_vars: cnf.num_vars,
                clauses: Vec::new(),
                unsat: true,
            },
            PresolveStats {
                fixed_vars: 0,
                removed_clauses: before,
            },
        );
    }

    clauses.sort();
    clauses.dedup();

    let units: Vec<Vec<Lit>> = assignment
        .iter()
        .enumerate()
        .filter_map(|(index, value)| value.map(|v| vec![Lit::from_index(index, v)]))
        .collect();
    let stats = PresolveStats {
        fixed_vars: units.len(),
        removed_clauses: before.saturating_sub(clauses.len() + units.len()),
    };
    debug!(
        "presolve: {} variables fixed, {} clauses removed, {} remain",
        stats.fixed_vars,
        stats.removed_clauses,
        clauses.len()
    );

    clauses.extend(units);
    (
        Cnf {
            num_vars: cnf.num_vars,
            clauses,
            unsat: false,
        },
        stats,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(index: usize, positive: bool) -> Lit {
        Lit::from_index(index, positive)
    }

    #[test]
    fn test_unit_propagation_chain() {
        let cnf = Cnf {
            num_vars: 3,
            clauses: vec![
                vec![lit(0, true)],
                vec![lit(0, false), lit(1, true)],
                vec![lit(1, false), lit(2, false)],
            ],
            unsat: false,
        };
        let (out, stats) = presolve(cnf);

        assert!(!out.unsat);
        assert_eq!(stats.fixed_vars, 3);
        let mut clauses = out.clauses;
        clauses.sort();
        assert_eq!(
            clauses,
            vec![vec![lit(0, true)], vec![lit(1, true)], vec![lit(2, false)]]
        );
    }

    #[test]
    fn test_tautologies_and_duplicates_removed() {
        let cnf = Cnf {
            num_vars: 2,
            clauses: vec![
                vec![lit(0, true), lit(0, false)],
                vec![lit(1, true), lit(0, true), lit(1, true)],
                vec![lit(0, true), lit(1, true)],
            ],
            unsat: false,
        };
        let (out, stats) = presolve(cnf);

        assert_eq!(out.clauses, vec![vec![lit(0, true), lit(1, true)]]);
        assert_eq!(stats.removed_clauses, 2);
    }

    #[test]
    fn test_conflict_detected() {
        let cnf = Cnf {
            num_vars: 1,
            clauses: vec![vec![lit(0, true)], vec![lit(0, false)]],
            unsat: false,
        };
        let (out, _) = presolve(cnf);
        assert!(out.unsat);
    }
}

//! varisat backend
//!
//! Satisfiability is one SAT call. Minimization is a linear descent: after
//! each solution with objective count `c`, the totalizer output for "at
//! least `c` true" is assumed false and the solver is called again, until
//! it reports UNSAT (optimal).
//!
//! The descent runs on its own thread and sends every improving assignment
//! over a channel. The caller waits on the channel until the deadline and
//! then keeps the best assignment received so far. varisat cannot be
//! interrupted inside a call, so a timed-out worker is flagged to stop and
//! detached; it exits as soon as its current call returns.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};
use varisat::{ExtendFormula, Lit, Solver};

use super::cnf::{Cnf, CnfEncoder};
use super::presolve::{presolve, PresolveStats};
use super::{ConstraintEngine, CpModel, EngineParams, SolveResponse, SolveStats, Status};

/// [`ConstraintEngine`] backed by the varisat CDCL solver
#[derive(Debug, Clone, Default)]
pub struct VarisatEngine {
    params: EngineParams,
}

impl VarisatEngine {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }
}

fn progress(enabled: bool, message: std::fmt::Arguments<'_>) {
    if enabled {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

/// Messages from the descent thread, in the order they are produced
enum Event {
    Encoded {
        cnf_vars: usize,
        clauses: usize,
        presolve: Option<PresolveStats>,
    },
    Improved {
        values: Vec<bool>,
        objective: Option<i64>,
    },
    Finished(Status),
}

impl ConstraintEngine for VarisatEngine {
    fn name(&self) -> &'static str {
        "varisat"
    }

    fn solve(&self, model: &CpModel) -> SolveResponse {
        let start = Instant::now();
        let deadline = self.params.time_limit().map(|limit| start + limit);
        let verbose = self.params.log_search_progress;
        let mut stats = SolveStats {
            model_vars: model.num_vars(),
            ..SolveStats::default()
        };

        if let Some(reason) = model.find_invalid_literal() {
            warn!("model rejected: {}", reason);
            return SolveResponse::without_solution(Status::ModelInvalid, stats);
        }
        if self.params.num_workers > 1 {
            debug!(
                "{} workers requested; the varisat backend searches on one thread",
                self.params.num_workers
            );
        }

        let (events, received) = channel();
        let stop = Arc::new(AtomicBool::new(false));
        let sat_calls = Arc::new(AtomicUsize::new(0));
        let descent = Descent {
            model: model.clone(),
            presolve: self.params.presolve,
            verbose,
            events,
            stop: Arc::clone(&stop),
            sat_calls: Arc::clone(&sat_calls),
            start,
        };
        let worker = match thread::Builder::new()
            .name("varisat-descent".to_string())
            .spawn(move || descent.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!("cannot start the solver thread: {}", e);
                return SolveResponse::without_solution(Status::Unknown, stats);
            }
        };

        let mut best: Option<(Vec<bool>, Option<i64>)> = None;
        let (status, finished) = loop {
            let event = match deadline {
                Some(d) => received.recv_timeout(d.saturating_duration_since(Instant::now())),
                None => received.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let fallback = if best.is_some() {
                Status::Feasible
            } else {
                Status::Unknown
            };
            match event {
                Ok(Event::Encoded {
                    cnf_vars,
                    clauses,
                    presolve,
                }) => {
                    stats.cnf_vars = cnf_vars;
                    stats.clauses = clauses;
                    stats.presolve = presolve;
                }
                Ok(Event::Improved { values, objective }) => best = Some((values, objective)),
                Ok(Event::Finished(status)) => break (status, true),
                Err(RecvTimeoutError::Timeout) => {
                    stop.store(true, Ordering::SeqCst);
                    progress(
                        verbose,
                        format_args!("#timeout after {:.3}s", start.elapsed().as_secs_f64()),
                    );
                    break (fallback, false);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("solver thread exited without a verdict");
                    break (fallback, false);
                }
            }
        };
        if finished {
            let _ = worker.join();
        }

        stats.sat_calls = sat_calls.load(Ordering::SeqCst);
        stats.wall_time_secs = start.elapsed().as_secs_f64();
        progress(
            verbose,
            format_args!(
                "#done {} after {} sat calls ({:.3}s)",
                status, stats.sat_calls, stats.wall_time_secs
            ),
        );

        match best {
            Some((values, objective)) if status.has_solution() => {
                SolveResponse::new(status, objective, values, stats)
            }
            _ => SolveResponse::without_solution(status, stats),
        }
    }
}

/// The solving half of a [`VarisatEngine::solve`] call, owned by the
/// descent thread
struct Descent {
    model: CpModel,
    presolve: bool,
    verbose: bool,
    events: Sender<Event>,
    stop: Arc<AtomicBool>,
    sat_calls: Arc<AtomicUsize>,
    start: Instant,
}

impl Descent {
    fn run(self) {
        let status = self.descend();
        let _ = self.events.send(Event::Finished(status));
    }

    fn descend(&self) -> Status {
        let (cnf, counter) = CnfEncoder::encode(&self.model);
        let (cnf, presolve_stats) = if self.presolve {
            let (cnf, stats) = presolve(cnf);
            (cnf, Some(stats))
        } else {
            (cnf, None)
        };
        progress(
            self.verbose,
            format_args!(
                "#model {} vars, {} cnf vars, {} clauses",
                self.model.num_vars(),
                cnf.num_vars,
                cnf.clauses.len()
            ),
        );
        let _ = self.events.send(Event::Encoded {
            cnf_vars: cnf.num_vars,
            clauses: cnf.clauses.len(),
            presolve: presolve_stats,
        });

        if cnf.unsat {
            return Status::Infeasible;
        }

        let mut solver = load(&cnf);
        let mut assumptions: Vec<Lit> = Vec::new();
        let mut found = false;

        loop {
            if self.stop.load(Ordering::SeqCst) {
                return if found {
                    Status::Feasible
                } else {
                    Status::Unknown
                };
            }

            solver.assume(&assumptions);
            let calls = self.sat_calls.fetch_add(1, Ordering::SeqCst) + 1;
            match solver.solve() {
                Ok(true) => {
                    let values = read_model(&solver, self.model.num_vars(), cnf.num_vars);
                    let objective = self.model.objective().map(|o| o.eval(&values));
                    let true_inputs = counter.as_ref().map(|c| {
                        c.inputs
                            .iter()
                            .filter(|l| values[l.var().index()] == l.is_positive())
                            .count()
                    });
                    found = true;
                    let _ = self.events.send(Event::Improved { values, objective });

                    let (Some(counter), Some(count)) = (&counter, true_inputs) else {
                        return Status::Optimal;
                    };
                    progress(
                        self.verbose,
                        format_args!(
                            "#{} objective {} ({:.3}s)",
                            calls,
                            counter.offset + count as i64,
                            self.start.elapsed().as_secs_f64()
                        ),
                    );
                    if count == 0 {
                        return Status::Optimal;
                    }
                    assumptions = vec![!counter.outputs[count - 1]];
                }
                Ok(false) => {
                    return if found {
                        Status::Optimal
                    } else {
                        Status::Infeasible
                    };
                }
                Err(e) => {
                    warn!("varisat stopped: {}", e);
                    return if found {
                        Status::Feasible
                    } else {
                        Status::Unknown
                    };
                }
            }
        }
    }
}

fn load(cnf: &Cnf) -> Solver<'static> {
    let mut solver = Solver::new();
    for clause in &cnf.clauses {
        solver.add_clause(clause);
    }
    solver
}

/// Model-variable part of the last satisfying assignment. Variables that
/// occur in no clause are unconstrained and read as false.
fn read_model(solver: &Solver<'_>, model_vars: usize, cnf_vars: usize) -> Vec<bool> {
    let mut values = vec![false; cnf_vars.max(model_vars)];
    for lit in solver.model().unwrap_or_default() {
        if let Some(slot) = values.get_mut(lit.var().index()) {
            *slot = lit.is_positive();
        }
    }
    values.truncate(model_vars);
    values
}

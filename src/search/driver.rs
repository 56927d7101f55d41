//! The best-first allocation search.
//!
//! Pops the open node with the lowest evaluation, emits the first
//! traits-satisfying node as the solution, and otherwise expands it one
//! assignment at a time. Three pruning rules bound the lattice:
//!
//! - **no-improvement**: a successor whose traits penalty equals its
//!   parent's can never help (the penalty is monotone) and only lengthens
//!   schedules;
//! - **duplicate**: matrices already expanded are skipped, keyed by their
//!   bit packing;
//! - **bound** (optional): successors worse than a configured penalty bound
//!   are dropped at generation.
//!
//! The scheduler runs only for traits-satisfying nodes; everything else
//! inherits its parent's schedule quality. Expansion order, tie-breaking,
//! and therefore the popped-node sequence are fully deterministic for a
//! given problem.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};
use thiserror::Error;

use crate::allocation::{Allocation, AllocationNode, TRAITS_EPSILON};
use crate::problem::ProblemInputs;
use crate::scheduling::{MilpScheduler, Schedule, ScheduleFailure};

use super::frontier::{ClosedSet, Frontier};
use super::metrics::{combined_quality, normalized_schedule_quality};

/// Fatal search failures. Recoverable scheduling failures never surface
/// here; they just disqualify a node.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("scheduler failure: {0}")]
    Scheduler(ScheduleFailure),
}

impl SearchError {
    /// Process exit code for an unavailable or broken solver back end.
    pub fn exit_code(&self) -> i32 {
        4
    }
}

/// A traits-satisfying allocation with its schedule and scores.
#[derive(Debug, Clone)]
pub struct Solution {
    pub allocation: Allocation,
    pub schedule: Schedule,
    pub traits_penalty: f64,
    pub nsq: f64,
}

/// How a search run ended.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The first traits-satisfying node popped from open.
    Solved(Solution),
    /// Open exhausted: no allocation can satisfy the desired traits and be
    /// scheduled.
    NoFeasibleAllocation,
    /// The global deadline expired. Carries the best scheduled incumbent
    /// seen so far, if any, flagged not proven optimal.
    DeadlineExpired { incumbent: Option<Solution> },
}

impl SearchOutcome {
    /// Process exit code per the external contract: 0 success (including a
    /// deadline incumbent), 1 no feasible allocation, 2 deadline with
    /// nothing to show.
    pub fn exit_code(&self) -> i32 {
        match self {
            SearchOutcome::Solved(_) => 0,
            SearchOutcome::NoFeasibleAllocation => 1,
            SearchOutcome::DeadlineExpired { incumbent: Some(_) } => 0,
            SearchOutcome::DeadlineExpired { incumbent: None } => 2,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            SearchOutcome::DeadlineExpired {
                incumbent: Some(solution),
            } => Some(solution),
            _ => None,
        }
    }
}

/// Node accounting for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    pub popped: usize,
    pub generated: usize,
    pub pruned_no_improvement: usize,
    pub pruned_duplicate: usize,
    pub pruned_bound: usize,
    pub scheduled: usize,
    pub schedule_infeasible: usize,
}

/// Outcome plus accounting.
#[derive(Debug)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// Best-first driver over allocation nodes.
#[derive(Debug)]
pub struct AllocationSearch<'a> {
    inputs: &'a ProblemInputs,
}

/// Node evaluation result: schedule quality plus the schedule itself for
/// goal-quality nodes, or `None` when the node cannot be scheduled.
type Evaluation = Option<(f64, Option<Arc<Schedule>>)>;

impl<'a> AllocationSearch<'a> {
    pub fn new(inputs: &'a ProblemInputs) -> Self {
        Self { inputs }
    }

    /// Runs the search to its first goal, exhaustion, or the global
    /// deadline.
    ///
    /// # Errors
    ///
    /// Only fatal scheduler failures (backend or invariant breakage);
    /// infeasible or timed-out nodes are absorbed.
    pub fn run(&self) -> Result<SearchReport, SearchError> {
        let started = Instant::now();
        let search_params = &self.inputs.parameters().search;
        let weight = search_params.weight;
        let scheduler = MilpScheduler::new(self.inputs);

        let mut stats = SearchStats::default();
        let mut open = Frontier::new();
        let mut closed = ClosedSet::new();
        let mut incumbent: Option<(f64, Solution)> = None;

        let root = AllocationNode::root(self.inputs.num_tasks(), self.inputs.num_robots());
        let root_allocation = root.allocation();
        let root_penalty = self.inputs.traits_penalty(&root_allocation);
        stats.generated += 1;
        match self.evaluate(&scheduler, &mut stats, root_penalty, 0.0, &root_allocation)? {
            Some((nsq, schedule)) => {
                let f = combined_quality(weight, root_penalty, nsq);
                update_incumbent(&mut incumbent, f, &root_allocation, root_penalty, nsq, &schedule);
                open.push(Arc::clone(&root), root_penalty, nsq, f, schedule);
            }
            None => stats.schedule_infeasible += 1,
        }

        loop {
            if started.elapsed().as_secs_f64() >= search_params.global_deadline {
                debug!("global deadline expired after {} pops", stats.popped);
                let incumbent = incumbent.map(|(_, mut solution)| {
                    solution.schedule.mark_not_proven_optimal();
                    solution
                });
                return Ok(SearchReport {
                    outcome: SearchOutcome::DeadlineExpired { incumbent },
                    stats,
                });
            }
            let Some(entry) = open.pop() else {
                debug!("open exhausted after {} pops", stats.popped);
                return Ok(SearchReport {
                    outcome: SearchOutcome::NoFeasibleAllocation,
                    stats,
                });
            };
            stats.popped += 1;
            trace!(
                "pop depth {} f {:.6} penalty {:.6}",
                entry.node.depth(),
                entry.f,
                entry.traits_penalty
            );

            let allocation = entry.node.allocation();
            if entry.traits_penalty <= TRAITS_EPSILON {
                let schedule = entry.schedule.ok_or_else(|| {
                    SearchError::Scheduler(ScheduleFailure::Internal(
                        "goal node reached open without a schedule".to_owned(),
                    ))
                })?;
                debug!(
                    "solution at depth {} with makespan {:.4}",
                    entry.node.depth(),
                    schedule.makespan().value()
                );
                return Ok(SearchReport {
                    outcome: SearchOutcome::Solved(Solution {
                        allocation,
                        schedule: (*schedule).clone(),
                        traits_penalty: entry.traits_penalty,
                        nsq: entry.nsq,
                    }),
                    stats,
                });
            }

            if !closed.insert(allocation.packed()) {
                stats.pruned_duplicate += 1;
                continue;
            }

            for successor in entry.node.successors() {
                stats.generated += 1;
                let successor_allocation = successor.allocation();
                let penalty = self.inputs.traits_penalty(&successor_allocation);
                if penalty >= entry.traits_penalty - TRAITS_EPSILON {
                    stats.pruned_no_improvement += 1;
                    continue;
                }
                if let Some(bound) = search_params.prune_penalty_above {
                    if penalty > bound {
                        stats.pruned_bound += 1;
                        continue;
                    }
                }
                if closed.contains(&successor_allocation.packed()) {
                    stats.pruned_duplicate += 1;
                    continue;
                }
                match self.evaluate(
                    &scheduler,
                    &mut stats,
                    penalty,
                    entry.nsq,
                    &successor_allocation,
                )? {
                    Some((nsq, schedule)) => {
                        let f = combined_quality(weight, penalty, nsq);
                        update_incumbent(
                            &mut incumbent,
                            f,
                            &successor_allocation,
                            penalty,
                            nsq,
                            &schedule,
                        );
                        open.push(successor, penalty, nsq, f, schedule);
                    }
                    None => stats.schedule_infeasible += 1,
                }
            }
            trace!("open {} nodes, closed {}", open.len(), closed.len());
        }
    }

    /// Scores a node. Traits-satisfying nodes are scheduled; the rest
    /// inherit the parent's schedule quality (0 at the root).
    fn evaluate(
        &self,
        scheduler: &MilpScheduler,
        stats: &mut SearchStats,
        penalty: f64,
        parent_nsq: f64,
        allocation: &Allocation,
    ) -> Result<Evaluation, SearchError> {
        if penalty > TRAITS_EPSILON {
            return Ok(Some((parent_nsq, None)));
        }
        stats.scheduled += 1;
        match scheduler.solve(allocation) {
            Ok(schedule) => {
                let nsq = normalized_schedule_quality(
                    schedule.makespan().value(),
                    self.inputs.makespan_bounds(),
                );
                Ok(Some((nsq, Some(Arc::new(schedule)))))
            }
            Err(failure) if failure.is_recoverable() => {
                trace!("allocation disqualified: {failure}");
                Ok(None)
            }
            Err(fatal) => Err(SearchError::Scheduler(fatal)),
        }
    }
}

fn update_incumbent(
    incumbent: &mut Option<(f64, Solution)>,
    f: f64,
    allocation: &Allocation,
    traits_penalty: f64,
    nsq: f64,
    schedule: &Option<Arc<Schedule>>,
) {
    let Some(schedule) = schedule else {
        return;
    };
    if incumbent.as_ref().map_or(true, |(best, _)| f < *best) {
        *incumbent = Some((
            f,
            Solution {
                allocation: allocation.clone(),
                schedule: (**schedule).clone(),
                traits_penalty,
                nsq,
            },
        ));
    }
}

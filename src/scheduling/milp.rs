//! The iterative MILP scheduler.
//!
//! `solve` runs the lazy refinement loop around a CBC mixed-integer program:
//!
//! 1. build the model with Euclidean lower-bound travel estimates;
//! 2. solve for minimum makespan (optionally a second, start-minimising pass
//!    under the fixed makespan when the hierarchical objective is enabled);
//! 3. promote exactly the travel entries the solution relies on — task
//!    traversals, chosen depot transitions, and chosen task-to-task
//!    transitions — to true motion-planner results;
//! 4. re-solve while any promotion changed a duration.
//!
//! Each entry is promoted at most once, so the loop terminates after
//! finitely many solves. A motion-planning failure on any needed entry, an
//! infeasible program, or a timeout without incumbent all surface as
//! recoverable [`ScheduleFailure`]s.

use std::collections::HashMap;
use std::time::Instant;

use good_lp::solvers::coin_cbc::{coin_cbc, CoinCbcProblem};
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use itertools::Itertools;
use log::debug;
use qtty::Quantity;

use crate::allocation::Allocation;
use crate::problem::ProblemInputs;

use super::error::ScheduleFailure;
use super::model::ScheduleModel;
use super::schedule::{Schedule, Timepoint};

/// Minimum-makespan scheduler for one candidate allocation.
#[derive(Debug)]
pub struct MilpScheduler<'a> {
    inputs: &'a ProblemInputs,
}

/// Extracted MILP solution.
struct MilpOutcome {
    starts: Vec<f64>,
    finishes: Vec<f64>,
    makespan: f64,
    /// Mutex pairs in their decided order.
    orderings: Vec<(usize, usize)>,
    /// Task visit order per robot.
    sequences: Vec<Vec<usize>>,
    proven_optimal: bool,
}

/// One binary in the robot-timeline encoding: `to` directly follows `from`
/// (`None` = the robot's depot) on `robot`'s timeline.
struct TimelineVar {
    robot: usize,
    from: Option<usize>,
    to: usize,
    duration: f64,
    var: Variable,
}

impl<'a> MilpScheduler<'a> {
    pub fn new(inputs: &'a ProblemInputs) -> Self {
        Self { inputs }
    }

    /// Schedules `allocation`, refining travel durations until they
    /// stabilise.
    ///
    /// # Errors
    ///
    /// Recoverable: [`ScheduleFailure::Infeasible`],
    /// [`ScheduleFailure::MotionInfeasible`],
    /// [`ScheduleFailure::TimeoutNoIncumbent`]. Fatal:
    /// [`ScheduleFailure::Solver`], [`ScheduleFailure::Internal`].
    pub fn solve(&self, allocation: &Allocation) -> Result<Schedule, ScheduleFailure> {
        let params = &self.inputs.parameters().scheduler;
        let mut model = ScheduleModel::build(self.inputs, allocation);
        let mut iteration = 0usize;
        loop {
            iteration += 1;
            let outcome = self.solve_phases(&model)?;
            if !params.compute_transition_duration_heuristic {
                debug!(
                    "scheduler finished on lower bounds: makespan {:.4}",
                    outcome.makespan
                );
                return Ok(emit(outcome));
            }
            let changed = self.refine(&mut model, &outcome)?;
            if !changed {
                debug!(
                    "scheduler converged after {iteration} iteration(s): makespan {:.4}",
                    outcome.makespan
                );
                return Ok(emit(outcome));
            }
            debug!("transition durations changed, re-solving (iteration {iteration})");
        }
    }

    /// Promotes the travel entries the solution relies on. Returns whether
    /// any duration changed.
    fn refine(
        &self,
        model: &mut ScheduleModel,
        outcome: &MilpOutcome,
    ) -> Result<bool, ScheduleFailure> {
        let mut changed = model.refine_executions(self.inputs)?;
        for (robot, sequence) in outcome.sequences.iter().enumerate() {
            if let Some(&first) = sequence.first() {
                changed |= model.refine_initial(self.inputs, robot, first)?;
            }
            for (&from, &to) in sequence.iter().tuple_windows() {
                changed |= model.refine_transition(self.inputs, from, to, robot)?;
            }
        }
        Ok(changed)
    }

    /// Minimum-makespan solve, plus the start-minimising tie-break pass when
    /// the hierarchical objective is configured.
    fn solve_phases(&self, model: &ScheduleModel) -> Result<MilpOutcome, ScheduleFailure> {
        let first = self.run_phase(model, None)?;
        if !self.inputs.parameters().scheduler.use_hierarchical_objective
            || model.num_tasks() == 0
        {
            return Ok(first);
        }
        let mut second = self.run_phase(model, Some(first.makespan))?;
        second.proven_optimal &= first.proven_optimal;
        Ok(second)
    }

    /// Builds and solves one MILP. `makespan_cap` switches the objective to
    /// the sum of starts under the capped makespan.
    fn run_phase(
        &self,
        model: &ScheduleModel,
        makespan_cap: Option<f64>,
    ) -> Result<MilpOutcome, ScheduleFailure> {
        let params = &self.inputs.parameters().scheduler;
        let num_tasks = model.num_tasks();
        let horizon = model.horizon();

        let mut vars = variables!();
        let makespan = vars.add(variable().min(0.0));
        let starts: Vec<Variable> = (0..num_tasks)
            .map(|_| vars.add(variable().min(0.0)))
            .collect();
        let finishes: Vec<Variable> = (0..num_tasks)
            .map(|_| vars.add(variable().min(0.0)))
            .collect();
        let mutex_vars: Vec<Variable> = model
            .mutexes()
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let mut timeline: Vec<TimelineVar> = Vec::new();
        // Chain-position variables (one per robot-task on multi-task
        // timelines) rule out degenerate subtours that the big-M timing
        // constraints alone would admit when durations collapse to zero.
        let mut positions: HashMap<(usize, usize), Variable> = HashMap::new();
        for robot in 0..model.num_robots() {
            let robot_tasks = model.robot_tasks(robot);
            if robot_tasks.len() >= 2 {
                for &task in robot_tasks {
                    let bound = (robot_tasks.len() - 1) as f64;
                    positions.insert((robot, task), vars.add(variable().min(0.0).max(bound)));
                }
            }
            for &to in robot_tasks {
                let duration = model.initial_duration(robot, to).ok_or_else(|| {
                    ScheduleFailure::Internal(format!(
                        "missing depot transition for robot {robot} and task {to}"
                    ))
                })?;
                timeline.push(TimelineVar {
                    robot,
                    from: None,
                    to,
                    duration,
                    var: vars.add(variable().binary()),
                });
            }
            for &from in robot_tasks {
                for &to in robot_tasks {
                    if from == to {
                        continue;
                    }
                    let duration = model.transition_duration(from, to, robot).ok_or_else(|| {
                        ScheduleFailure::Internal(format!(
                            "missing transition for robot {robot} from task {from} to task {to}"
                        ))
                    })?;
                    timeline.push(TimelineVar {
                        robot,
                        from: Some(from),
                        to,
                        duration,
                        var: vars.add(variable().binary()),
                    });
                }
            }
        }

        let objective: Expression = match makespan_cap {
            None => makespan.into(),
            Some(_) => starts.iter().sum::<Expression>(),
        };
        let mut problem = vars.minimise(objective).using(coin_cbc);
        configure_solver(&mut problem, params.timeout, params.threads, params.quick);

        for task in 0..num_tasks {
            problem = problem.with(constraint!(
                finishes[task] - starts[task] == model.duration(task)
            ));
            problem = problem.with(constraint!(makespan - finishes[task] >= 0.0));
        }
        for &(before, after) in model.precedence() {
            problem = problem.with(constraint!(starts[after] - finishes[before] >= 0.0));
        }
        for (&(i, j), &order) in model.mutexes().iter().zip(&mutex_vars) {
            // order = 1 places i before j, 0 the reverse.
            problem = problem.with(constraint!(
                starts[j] - finishes[i] + horizon - horizon * order >= 0.0
            ));
            problem = problem.with(constraint!(starts[i] - finishes[j] + horizon * order >= 0.0));
        }
        for robot in 0..model.num_robots() {
            let robot_tasks = model.robot_tasks(robot);
            if robot_tasks.is_empty() {
                continue;
            }
            let firsts: Vec<Variable> = timeline
                .iter()
                .filter(|tv| tv.robot == robot && tv.from.is_none())
                .map(|tv| tv.var)
                .collect();
            problem = problem.with(constraint!(firsts.iter().sum::<Expression>() == 1.0));
            for &task in robot_tasks {
                // A task is either the robot's first or follows exactly one
                // other task; it precedes at most one.
                let incoming: Vec<Variable> = timeline
                    .iter()
                    .filter(|tv| tv.robot == robot && tv.to == task)
                    .map(|tv| tv.var)
                    .collect();
                problem = problem.with(constraint!(incoming.iter().sum::<Expression>() == 1.0));
                let outgoing: Vec<Variable> = timeline
                    .iter()
                    .filter(|tv| tv.robot == robot && tv.from == Some(task))
                    .map(|tv| tv.var)
                    .collect();
                if !outgoing.is_empty() {
                    problem = problem.with(constraint!(outgoing.iter().sum::<Expression>() <= 1.0));
                }
            }
        }
        for tv in &timeline {
            match tv.from {
                None => {
                    problem = problem.with(constraint!(starts[tv.to] - tv.duration * tv.var >= 0.0));
                }
                Some(from) => {
                    problem = problem.with(constraint!(
                        starts[tv.to] - finishes[from] - tv.duration + horizon - horizon * tv.var
                            >= 0.0
                    ));
                    if let (Some(&pos_from), Some(&pos_to)) = (
                        positions.get(&(tv.robot, from)),
                        positions.get(&(tv.robot, tv.to)),
                    ) {
                        let span = model.robot_tasks(tv.robot).len() as f64;
                        problem = problem.with(constraint!(
                            pos_to - pos_from - 1.0 + span - span * tv.var >= 0.0
                        ));
                    }
                }
            }
        }
        if let Some(cap) = makespan_cap {
            problem = problem.with(constraint!(makespan <= cap + 1e-6));
        }

        let solve_started = Instant::now();
        let result = problem.solve();
        let timed_out = solve_started.elapsed().as_secs_f64() >= params.timeout;
        let solution = match result {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(ScheduleFailure::Infeasible),
            Err(error) => {
                return Err(if timed_out {
                    ScheduleFailure::TimeoutNoIncumbent {
                        timeout: params.timeout,
                    }
                } else {
                    ScheduleFailure::Solver(error.to_string())
                })
            }
        };

        let orderings = model
            .mutexes()
            .iter()
            .zip(&mutex_vars)
            .map(|(&(i, j), &order)| {
                if solution.value(order) > 0.5 {
                    (i, j)
                } else {
                    (j, i)
                }
            })
            .collect();
        let sequences = extract_sequences(model, &timeline, &solution)?;

        Ok(MilpOutcome {
            starts: starts.iter().map(|&v| solution.value(v)).collect(),
            finishes: finishes.iter().map(|&v| solution.value(v)).collect(),
            makespan: solution.value(makespan),
            orderings,
            sequences,
            proven_optimal: !timed_out && !params.quick,
        })
    }
}

fn configure_solver(problem: &mut CoinCbcProblem, timeout: f64, threads: u32, quick: bool) {
    problem.set_parameter("logLevel", "0");
    if timeout.is_finite() && timeout > 0.0 {
        problem.set_parameter("seconds", &format!("{timeout:.3}"));
    }
    if threads > 0 {
        problem.set_parameter("threads", &threads.to_string());
    }
    if quick {
        // Accept the first feasible incumbent instead of closing the gap.
        problem.set_parameter("ratioGap", "1.0");
    }
}

/// Reconstructs each robot's task chain from the selected timeline binaries.
fn extract_sequences(
    model: &ScheduleModel,
    timeline: &[TimelineVar],
    solution: &impl Solution,
) -> Result<Vec<Vec<usize>>, ScheduleFailure> {
    let mut sequences = Vec::with_capacity(model.num_robots());
    for robot in 0..model.num_robots() {
        let robot_tasks = model.robot_tasks(robot);
        let mut sequence = Vec::with_capacity(robot_tasks.len());
        if robot_tasks.is_empty() {
            sequences.push(sequence);
            continue;
        }
        let mut cursor = timeline
            .iter()
            .find(|tv| tv.robot == robot && tv.from.is_none() && solution.value(tv.var) > 0.5)
            .map(|tv| tv.to);
        while let Some(task) = cursor {
            if sequence.len() > robot_tasks.len() {
                return Err(ScheduleFailure::Internal(format!(
                    "robot {robot} timeline is not a simple chain"
                )));
            }
            sequence.push(task);
            cursor = timeline
                .iter()
                .find(|tv| {
                    tv.robot == robot && tv.from == Some(task) && solution.value(tv.var) > 0.5
                })
                .map(|tv| tv.to);
        }
        if sequence.len() != robot_tasks.len() {
            return Err(ScheduleFailure::Internal(format!(
                "robot {robot} timeline covers {} of {} tasks",
                sequence.len(),
                robot_tasks.len()
            )));
        }
        sequences.push(sequence);
    }
    Ok(sequences)
}

fn emit(outcome: MilpOutcome) -> Schedule {
    let timepoints = outcome
        .starts
        .iter()
        .zip(&outcome.finishes)
        .map(|(&start, &finish)| Timepoint::new(Quantity::new(start), Quantity::new(finish)))
        .collect();
    Schedule::new(
        timepoints,
        outcome.orderings,
        outcome.sequences,
        outcome.proven_optimal,
    )
}

//! The per-candidate schedule model: durations, mutexes, and transition
//! estimates.

use qtty::Quantity;

use crate::allocation::Allocation;
use crate::problem::ProblemInputs;

use super::error::ScheduleFailure;

/// One robot's travel option, either between two tasks or out of its depot.
///
/// `refined` distinguishes the admissible lower bound from a true
/// motion-planner result; refinement promotes an entry at most once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub robot: usize,
    pub duration: f64,
    pub refined: bool,
}

/// Everything the MILP needs about one candidate allocation.
///
/// Built once per scheduler call with lower-bound travel estimates, then
/// mutated in place as the refinement loop promotes the entries the solver
/// actually selected.
#[derive(Debug)]
pub struct ScheduleModel {
    static_durations: Vec<f64>,
    /// Per task: the assigned robots' initial→terminal traversal estimates.
    execution: Vec<Vec<Transition>>,
    /// Per task: travel from each assigned robot's depot to the task.
    initial_transitions: Vec<Vec<Transition>>,
    /// `[from][to]`: travel options for robots assigned to both tasks.
    transitions: Vec<Vec<Vec<Transition>>>,
    /// Task sets per robot, index order.
    robot_tasks: Vec<Vec<usize>>,
    /// External precedence edges.
    precedence: Vec<(usize, usize)>,
    /// Shared-robot pairs not already ordered by transitive precedence.
    mutexes: Vec<(usize, usize)>,
}

impl ScheduleModel {
    /// Builds the model for `allocation` with Euclidean lower-bound travel
    /// estimates throughout.
    pub fn build(inputs: &ProblemInputs, allocation: &Allocation) -> Self {
        let cache = inputs.motion_cache();
        let num_tasks = allocation.num_tasks();

        let static_durations = inputs
            .tasks()
            .iter()
            .map(|task| task.static_duration().value())
            .collect();

        let mut execution = Vec::with_capacity(num_tasks);
        let mut initial_transitions = Vec::with_capacity(num_tasks);
        for (index, task) in inputs.tasks().iter().enumerate() {
            let mut traversals = Vec::new();
            let mut from_depot = Vec::new();
            for robot_index in allocation.assigned_robots(index) {
                let robot = inputs.robot(robot_index);
                traversals.push(Transition {
                    robot: robot_index,
                    duration: cache
                        .lower_bound(
                            robot.species(),
                            task.initial_configuration(),
                            task.terminal_configuration(),
                        )
                        .value(),
                    refined: false,
                });
                from_depot.push(Transition {
                    robot: robot_index,
                    duration: cache
                        .lower_bound(
                            robot.species(),
                            robot.initial_configuration(),
                            task.initial_configuration(),
                        )
                        .value(),
                    refined: false,
                });
            }
            execution.push(traversals);
            initial_transitions.push(from_depot);
        }

        let mut transitions = vec![vec![Vec::new(); num_tasks]; num_tasks];
        for from in 0..num_tasks {
            for to in 0..num_tasks {
                if from == to {
                    continue;
                }
                for robot_index in allocation.assigned_robots(from) {
                    if !allocation.get(to, robot_index) {
                        continue;
                    }
                    let robot = inputs.robot(robot_index);
                    transitions[from][to].push(Transition {
                        robot: robot_index,
                        duration: cache
                            .lower_bound(
                                robot.species(),
                                inputs.task(from).terminal_configuration(),
                                inputs.task(to).initial_configuration(),
                            )
                            .value(),
                        refined: false,
                    });
                }
            }
        }

        let robot_tasks = (0..allocation.num_robots())
            .map(|robot| allocation.tasks_of(robot).collect())
            .collect();

        let plan = inputs.plan();
        let mutexes = allocation
            .shared_robot_pairs()
            .into_iter()
            .filter(|&(i, j)| !plan.ordered_either_way(i, j))
            .collect();

        Self {
            static_durations,
            execution,
            initial_transitions,
            transitions,
            robot_tasks,
            precedence: plan.edges().to_vec(),
            mutexes,
        }
    }

    pub fn num_tasks(&self) -> usize {
        self.static_durations.len()
    }

    /// Execution duration of a task: its static duration plus the slowest
    /// assigned robot's traversal. Without robots the static duration stands
    /// alone.
    pub fn duration(&self, task: usize) -> f64 {
        self.static_durations[task]
            + self.execution[task]
                .iter()
                .map(|t| t.duration)
                .fold(0.0, f64::max)
    }

    pub fn durations(&self) -> Vec<f64> {
        (0..self.num_tasks()).map(|i| self.duration(i)).collect()
    }

    pub fn precedence(&self) -> &[(usize, usize)] {
        &self.precedence
    }

    /// The reduced mutex set: pairs sharing a robot and not transitively
    /// ordered. Stable across refinement iterations.
    pub fn mutexes(&self) -> &[(usize, usize)] {
        &self.mutexes
    }

    pub fn robot_tasks(&self, robot: usize) -> &[usize] {
        &self.robot_tasks[robot]
    }

    pub fn num_robots(&self) -> usize {
        self.robot_tasks.len()
    }

    pub fn initial_transitions(&self, task: usize) -> &[Transition] {
        &self.initial_transitions[task]
    }

    pub fn transitions(&self, from: usize, to: usize) -> &[Transition] {
        &self.transitions[from][to]
    }

    pub fn execution_transitions(&self, task: usize) -> &[Transition] {
        &self.execution[task]
    }

    /// The depot transition duration for `(robot, task)`.
    pub fn initial_duration(&self, robot: usize, task: usize) -> Option<f64> {
        self.initial_transitions[task]
            .iter()
            .find(|t| t.robot == robot)
            .map(|t| t.duration)
    }

    /// The task-to-task transition duration for `robot`.
    pub fn transition_duration(&self, from: usize, to: usize, robot: usize) -> Option<f64> {
        self.transitions[from][to]
            .iter()
            .find(|t| t.robot == robot)
            .map(|t| t.duration)
    }

    /// A finite horizon dominating every feasible makespan; used as the
    /// big-M constant in the disjunctive constraints.
    pub fn horizon(&self) -> f64 {
        let durations: f64 = self.durations().iter().sum();
        let depot: f64 = self
            .initial_transitions
            .iter()
            .map(|options| options.iter().map(|t| t.duration).fold(0.0, f64::max))
            .sum();
        let travel: f64 = self
            .transitions
            .iter()
            .flatten()
            .map(|options| options.iter().map(|t| t.duration).fold(0.0, f64::max))
            .sum();
        durations + depot + travel + 1.0
    }

    /// Promotes every still-unrefined execution traversal to a true motion
    /// plan. Returns whether any duration changed.
    ///
    /// # Errors
    ///
    /// [`ScheduleFailure::MotionInfeasible`] when a task's own traversal has
    /// no path for an assigned robot.
    pub(crate) fn refine_executions(
        &mut self,
        inputs: &ProblemInputs,
    ) -> Result<bool, ScheduleFailure> {
        let timeout = Quantity::new(inputs.parameters().motion.timeout);
        let cache = inputs.motion_cache();
        let mut changed = false;
        for (task_index, options) in self.execution.iter_mut().enumerate() {
            let task = inputs.task(task_index);
            for option in options.iter_mut().filter(|o| !o.refined) {
                let robot = inputs.robot(option.robot);
                let duration = cache
                    .travel_time(
                        robot.species(),
                        task.initial_configuration(),
                        task.terminal_configuration(),
                        timeout,
                    )
                    .map_err(|_| ScheduleFailure::MotionInfeasible {
                        robot: option.robot,
                        to_task: task_index,
                        from_task: Some(task_index),
                    })?
                    .value();
                changed |= (duration - option.duration).abs() > 1e-9;
                option.duration = duration;
                option.refined = true;
            }
        }
        Ok(changed)
    }

    /// Promotes the depot transition for `(robot, task)` if still a lower
    /// bound. Returns whether the duration changed.
    pub(crate) fn refine_initial(
        &mut self,
        inputs: &ProblemInputs,
        robot_index: usize,
        task_index: usize,
    ) -> Result<bool, ScheduleFailure> {
        let timeout = Quantity::new(inputs.parameters().motion.timeout);
        let robot = inputs.robot(robot_index);
        let task = inputs.task(task_index);
        let option = self.initial_transitions[task_index]
            .iter_mut()
            .find(|t| t.robot == robot_index)
            .ok_or_else(|| {
                ScheduleFailure::Internal(format!(
                    "no depot transition for robot {robot_index} and task {task_index}"
                ))
            })?;
        if option.refined {
            return Ok(false);
        }
        let duration = inputs
            .motion_cache()
            .travel_time(
                robot.species(),
                robot.initial_configuration(),
                task.initial_configuration(),
                timeout,
            )
            .map_err(|_| ScheduleFailure::MotionInfeasible {
                robot: robot_index,
                to_task: task_index,
                from_task: None,
            })?
            .value();
        let changed = (duration - option.duration).abs() > 1e-9;
        option.duration = duration;
        option.refined = true;
        Ok(changed)
    }

    /// Promotes the `(from, to)` transition for `robot` if still a lower
    /// bound. Returns whether the duration changed.
    pub(crate) fn refine_transition(
        &mut self,
        inputs: &ProblemInputs,
        from: usize,
        to: usize,
        robot_index: usize,
    ) -> Result<bool, ScheduleFailure> {
        let timeout = Quantity::new(inputs.parameters().motion.timeout);
        let robot = inputs.robot(robot_index);
        let option = self.transitions[from][to]
            .iter_mut()
            .find(|t| t.robot == robot_index)
            .ok_or_else(|| {
                ScheduleFailure::Internal(format!(
                    "no transition for robot {robot_index} from task {from} to task {to}"
                ))
            })?;
        if option.refined {
            return Ok(false);
        }
        let duration = inputs
            .motion_cache()
            .travel_time(
                robot.species(),
                inputs.task(from).terminal_configuration(),
                inputs.task(to).initial_configuration(),
                timeout,
            )
            .map_err(|_| ScheduleFailure::MotionInfeasible {
                robot: robot_index,
                to_task: to,
                from_task: Some(from),
            })?
            .value();
        let changed = (duration - option.duration).abs() > 1e-9;
        option.duration = duration;
        option.refined = true;
        Ok(changed)
    }
}

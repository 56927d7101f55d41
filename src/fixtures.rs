//! Shared test fixtures: reference plans, fleets, and canned allocations.
//!
//! The plans share a pool of tasks on a small planar workspace; the fleets
//! park robot `i` at `(i, 0)`. Trait vectors are empty here because the
//! scheduler ignores them; search tests build their own trait-bearing
//! problems.

use std::sync::Arc;

use qtty::Quantity;

use crate::allocation::Allocation;
use crate::geometry::{Configuration, StraightLinePlanner};
use crate::mission::Task;
use crate::problem::{MakespanBounds, Parameters, ProblemInputs};
use crate::team::{Robot, Species};

pub(crate) fn se2(x: f64, y: f64) -> Configuration {
    Configuration::se2(x, y)
}

pub(crate) fn task(name: &str, duration: f64, initial: Configuration, terminal: Configuration) -> Task {
    Task::new(name, Quantity::new(duration), vec![], initial, terminal)
}

fn task_pool() -> Vec<Task> {
    vec![
        task("t1", 1.0, se2(0.0, 1.0), se2(0.0, 1.0)),
        task("t2", 2.0, se2(1.0, 1.0), se2(1.0, 2.0)),
        task("t3", 1.0, se2(2.0, 1.0), se2(2.0, 4.0)),
        task("t4", 2.0, se2(3.0, 3.0), se2(3.0, 3.0)),
        task("t5", 3.0, se2(2.5, 2.5), se2(1.7, 1.7)),
        task("t6", 1.5, se2(3.68, 3.0), se2(3.0, 2.5)),
        task("t7", 0.5, se2(10.0, 5.0), se2(7.0, 3.5)),
    ]
}

/// `t1 → t2 → t3`, with the redundant transitive edge kept.
pub(crate) fn total_order_plan() -> (Vec<Task>, Vec<(usize, usize)>) {
    let mut tasks = task_pool();
    tasks.truncate(3);
    (tasks, vec![(0, 1), (0, 2), (1, 2)])
}

/// `t1 → {t2, t3}`.
pub(crate) fn branch_plan() -> (Vec<Task>, Vec<(usize, usize)>) {
    let mut tasks = task_pool();
    tasks.truncate(3);
    (tasks, vec![(0, 1), (0, 2)])
}

/// `t1 → {t2, t3} → t4`.
pub(crate) fn diamond_plan() -> (Vec<Task>, Vec<(usize, usize)>) {
    let mut tasks = task_pool();
    tasks.truncate(4);
    (tasks, vec![(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)])
}

/// Two independent chains `t1 → t2` and `t3 → t4`.
pub(crate) fn parallel_plan() -> (Vec<Task>, Vec<(usize, usize)>) {
    let mut tasks = task_pool();
    tasks.truncate(4);
    (tasks, vec![(0, 1), (2, 3)])
}

/// Seven tasks with a dense partial order.
pub(crate) fn complex_plan() -> (Vec<Task>, Vec<(usize, usize)>) {
    (
        task_pool(),
        vec![
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 3),
            (1, 4),
            (2, 3),
            (2, 4),
            (3, 4),
            (5, 2),
            (5, 3),
            (5, 4),
            (5, 6),
        ],
    )
}

pub(crate) fn burger() -> Arc<Species> {
    Arc::new(Species::new(
        "burger",
        vec![],
        0.2,
        0.2,
        Arc::new(StraightLinePlanner),
    ))
}

pub(crate) fn waffle() -> Arc<Species> {
    Arc::new(Species::new(
        "waffle",
        vec![],
        0.32,
        0.24,
        Arc::new(StraightLinePlanner),
    ))
}

/// `num` burger robots parked at `(i, 0)`.
pub(crate) fn homogeneous_fleet(num: usize) -> Vec<Robot> {
    let species = burger();
    (0..num)
        .map(|i| {
            Robot::new(
                format!("r{i}"),
                Arc::clone(&species),
                se2(i as f64, 0.0),
            )
        })
        .collect()
}

/// Robots at `(i, 0)` alternating waffle (even) and burger (odd).
pub(crate) fn heterogeneous_fleet(num: usize) -> Vec<Robot> {
    let waffle = waffle();
    let burger = burger();
    (0..num)
        .map(|i| {
            let species = if i % 2 == 0 { &waffle } else { &burger };
            Robot::new(format!("r{i}"), Arc::clone(species), se2(i as f64, 0.0))
        })
        .collect()
}

/// Robot `i` does task `i`.
pub(crate) fn identity_allocation(num_tasks: usize) -> Allocation {
    let mut allocation = Allocation::zeros(num_tasks, num_tasks);
    for i in 0..num_tasks {
        allocation.set(i, i, true);
    }
    allocation
}

/// One robot fewer than tasks; task `i` goes to robot `i % (m − 1)`, so one
/// robot carries two tasks.
pub(crate) fn multi_task_robot_allocation(num_tasks: usize) -> Allocation {
    let num_robots = num_tasks - 1;
    let mut allocation = Allocation::zeros(num_tasks, num_robots);
    for i in 0..num_tasks {
        allocation.set(i, i % num_robots, true);
    }
    allocation
}

/// Seven tasks over three robots: r0 → {0, 1, 3, 4}, r1 → {5, 2},
/// r2 → {5, 6}.
pub(crate) fn complex_allocation() -> Allocation {
    let mut allocation = Allocation::zeros(7, 3);
    for (task, robot) in [(0, 0), (1, 0), (3, 0), (4, 0), (5, 1), (2, 1), (5, 2), (6, 2)] {
        allocation.set(task, robot, true);
    }
    allocation
}

/// Seven tasks over three robots: r0 → {0, 6, 2}, r1 → {1, 5, 3},
/// r2 → {2, 4}.
pub(crate) fn complex2_allocation() -> Allocation {
    let mut allocation = Allocation::zeros(7, 3);
    for (task, robot) in [(0, 0), (6, 0), (2, 0), (1, 1), (5, 1), (3, 1), (2, 2), (4, 2)] {
        allocation.set(task, robot, true);
    }
    allocation
}

/// Scheduler-oriented problem: default parameters, makespan bounds unused by
/// the MILP.
pub(crate) fn scheduling_problem(
    tasks: Vec<Task>,
    precedence: &[(usize, usize)],
    robots: Vec<Robot>,
) -> ProblemInputs {
    ProblemInputs::new(
        robots,
        tasks,
        precedence,
        MakespanBounds {
            best: 0.0,
            worst: 100.0,
        },
        Parameters::default(),
    )
    .expect("fixture inputs are well formed")
}

//! Scheduler test suite over the reference plans and fleets.

use super::*;
use crate::allocation::Allocation;
use crate::fixtures::*;
use crate::problem::ProblemInputs;
use crate::team::Robot;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "{what}: expected {expected}, got {actual}"
    );
}

fn solve(inputs: &ProblemInputs, allocation: &Allocation) -> Schedule {
    MilpScheduler::new(inputs)
        .solve(allocation)
        .expect("allocation should be schedulable")
}

fn assert_timepoints(schedule: &Schedule, expected: &[(f64, f64)]) {
    assert_eq!(schedule.timepoints().len(), expected.len());
    for (task, (timepoint, &(start, finish))) in
        schedule.timepoints().iter().zip(expected).enumerate()
    {
        assert_close(timepoint.start().value(), start, &format!("task {task} start"));
        assert_close(
            timepoint.finish().value(),
            finish,
            &format!("task {task} finish"),
        );
    }
}

/// Audits an emitted schedule against the model it was solved from: task
/// durations (static plus the slowest coalition traversal), precedence,
/// mutex disjointness, and transition timing on every robot timeline.
fn assert_schedule_feasible(
    inputs: &ProblemInputs,
    allocation: &Allocation,
    schedule: &Schedule,
) {
    let model = ScheduleModel::build(inputs, allocation);
    let start = |task: usize| schedule.timepoints()[task].start().value();
    let finish = |task: usize| schedule.timepoints()[task].finish().value();

    for task in 0..schedule.timepoints().len() {
        let traversal = model
            .execution_transitions(task)
            .iter()
            .map(|t| t.duration)
            .fold(0.0, f64::max);
        let expected = inputs.task(task).static_duration().value() + traversal;
        assert!(
            (finish(task) - start(task) - expected).abs() < 1e-4,
            "task {task} duration drifts from its coalition traversal"
        );
    }
    for &(before, after) in model.precedence() {
        assert!(
            start(after) >= finish(before) - 1e-4,
            "precedence {before} -> {after} violated"
        );
    }
    for &(i, j) in model.mutexes() {
        assert!(
            start(j) >= finish(i) - 1e-4 || start(i) >= finish(j) - 1e-4,
            "mutex {{{i}, {j}}} intervals overlap"
        );
    }
    for &(i, j) in schedule.decided_orderings() {
        assert!(
            start(j) >= finish(i) - 1e-4,
            "decided ordering {i} -> {j} violated"
        );
    }
    for (robot, sequence) in schedule.robot_sequences().iter().enumerate() {
        if let Some(&first) = sequence.first() {
            let depot = model
                .initial_duration(robot, first)
                .expect("first task is assigned");
            assert!(
                start(first) >= depot - 1e-4,
                "robot {robot} starts task {first} before arriving"
            );
        }
        for window in sequence.windows(2) {
            let (from, to) = (window[0], window[1]);
            let travel = model
                .transition_duration(from, to, robot)
                .expect("consecutive tasks share the robot");
            assert!(
                start(to) >= finish(from) + travel - 1e-4,
                "robot {robot} transition {from} -> {to} violated"
            );
        }
    }
}

/// Fleet parked exactly on each task's initial configuration, removing the
/// depot transitions from the picture.
fn colocated_fleet(inputs_tasks: &[crate::mission::Task]) -> Vec<Robot> {
    let species = burger();
    inputs_tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            Robot::new(
                format!("r{i}"),
                std::sync::Arc::clone(&species),
                *task.initial_configuration(),
            )
        })
        .collect()
}

/// As [`colocated_fleet`], alternating waffle (even) and burger (odd).
fn colocated_heterogeneous_fleet(inputs_tasks: &[crate::mission::Task]) -> Vec<Robot> {
    let waffle = waffle();
    let burger = burger();
    inputs_tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let species = if i % 2 == 0 { &waffle } else { &burger };
            Robot::new(
                format!("r{i}"),
                std::sync::Arc::clone(species),
                *task.initial_configuration(),
            )
        })
        .collect()
}

mod durations {
    use super::*;

    #[test]
    fn unallocated_plans_reduce_to_static_durations() {
        for (tasks, precedence) in [
            total_order_plan(),
            branch_plan(),
            diamond_plan(),
            parallel_plan(),
            complex_plan(),
        ] {
            let statics: Vec<f64> = tasks
                .iter()
                .map(|t| t.static_duration().value())
                .collect();
            let num_tasks = tasks.len();
            let inputs =
                scheduling_problem(tasks, &precedence, homogeneous_fleet(num_tasks));
            let model = ScheduleModel::build(&inputs, &Allocation::zeros(num_tasks, num_tasks));
            assert_eq!(model.durations(), statics);
        }
    }

    #[test]
    fn identity_allocation_adds_traversal_time() {
        let (tasks, precedence) = total_order_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &identity_allocation(3));
        for (task, expected) in [1.0, 7.0, 16.0].into_iter().enumerate() {
            assert_close(model.duration(task), expected, &format!("duration {task}"));
        }
    }

    #[test]
    fn complex_identity_homogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(7));
        let model = ScheduleModel::build(&inputs, &identity_allocation(7));
        let expected = [
            1.0,
            7.0,
            16.0,
            2.0,
            8.65685424949,
            5.7201895692,
            17.2705098312,
        ];
        for (task, expected) in expected.into_iter().enumerate() {
            assert_close(model.duration(task), expected, &format!("duration {task}"));
        }
    }

    #[test]
    fn complex_identity_heterogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, heterogeneous_fleet(7));
        let model = ScheduleModel::build(&inputs, &identity_allocation(7));
        let expected = [1.0, 7.0, 13.5, 2.0, 7.71404520791, 5.7201895692, 14.4754248594];
        for (task, expected) in expected.into_iter().enumerate() {
            assert_close(model.duration(task), expected, &format!("duration {task}"));
        }
    }
}

mod mutex_reduction {
    use super::*;

    #[test]
    fn transitively_ordered_pairs_are_dropped() {
        for (name, (tasks, precedence)) in [
            ("total order", total_order_plan()),
            ("branch", branch_plan()),
            ("diamond", diamond_plan()),
        ] {
            let num_tasks = tasks.len();
            let inputs =
                scheduling_problem(tasks, &precedence, homogeneous_fleet(num_tasks - 1));
            let model =
                ScheduleModel::build(&inputs, &multi_task_robot_allocation(num_tasks));
            assert!(
                model.mutexes().is_empty(),
                "{name}: expected an empty reduced mutex set"
            );
        }
    }

    #[test]
    fn unordered_shared_pairs_survive() {
        let (tasks, precedence) = parallel_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &multi_task_robot_allocation(4));
        assert_eq!(model.mutexes(), &[(0, 3)]);
    }

    #[test]
    fn dense_complex_allocation_reduces_to_nothing() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &complex_allocation());
        assert!(model.mutexes().is_empty());
    }

    #[test]
    fn complex2_keeps_three_pairs() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, heterogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &complex2_allocation());
        assert_eq!(model.mutexes(), &[(0, 6), (1, 5), (2, 6)]);
    }
}

mod transition_estimates {
    use super::*;

    fn initial_durations(model: &ScheduleModel, task: usize) -> Vec<f64> {
        model
            .initial_transitions(task)
            .iter()
            .map(|t| t.duration)
            .collect()
    }

    #[test]
    fn depot_transitions_total_order_identity() {
        let (tasks, precedence) = total_order_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &identity_allocation(3));
        for task in 0..3 {
            assert_eq!(initial_durations(&model, task), vec![5.0]);
        }
    }

    #[test]
    fn depot_transitions_complex_identity() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(7));
        let model = ScheduleModel::build(&inputs, &identity_allocation(7));
        let expected = [
            5.0,
            5.0,
            5.0,
            15.0,
            14.577379737113251,
            16.387800340497193,
            32.01562118716424,
        ];
        for (task, expected) in expected.into_iter().enumerate() {
            let durations = initial_durations(&model, task);
            assert_eq!(durations.len(), 1);
            assert_close(durations[0], expected, &format!("depot transition {task}"));
        }
    }

    #[test]
    fn depot_transitions_complex_allocation_homogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &complex_allocation());
        let expected: [&[f64]; 7] = [
            &[5.0],
            &[7.0710678118654755],
            &[7.0710678118654755],
            &[21.213203435596423],
            &[17.67766952966369],
            &[20.113676938839404, 17.191858538273284],
            &[47.169905660283014],
        ];
        for (task, expected) in expected.into_iter().enumerate() {
            let durations = initial_durations(&model, task);
            assert_eq!(durations.len(), expected.len());
            for (got, want) in durations.iter().zip(expected) {
                assert_close(*got, *want, &format!("depot transition {task}"));
            }
        }
    }

    #[test]
    fn depot_transitions_complex_allocation_heterogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, heterogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &complex_allocation());
        let expected: [&[f64]; 7] = [
            &[4.166666666666667],
            &[5.892556509887896],
            &[7.0710678118654755],
            &[17.67766952966369],
            &[14.73139127471974],
            &[20.113676938839404, 14.326548781894404],
            &[39.30825471690252],
        ];
        for (task, expected) in expected.into_iter().enumerate() {
            let durations = initial_durations(&model, task);
            assert_eq!(durations.len(), expected.len());
            for (got, want) in durations.iter().zip(expected) {
                assert_close(*got, *want, &format!("depot transition {task}"));
            }
        }
    }

    #[test]
    fn task_transitions_disjoint_identity_are_empty() {
        let (tasks, precedence) = total_order_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &identity_allocation(3));
        for from in 0..3 {
            for to in 0..3 {
                assert!(model.transitions(from, to).is_empty());
            }
        }
    }

    #[test]
    fn task_transitions_complex_allocation_homogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let model = ScheduleModel::build(&inputs, &complex_allocation());

        let expect_single = |from: usize, to: usize, robot: usize, duration: f64| {
            let options = model.transitions(from, to);
            assert_eq!(options.len(), 1, "transition {from} -> {to}");
            assert_eq!(options[0].robot, robot);
            assert_close(options[0].duration, duration, &format!("transition {from} -> {to}"));
        };

        expect_single(0, 1, 0, 5.0);
        expect_single(0, 3, 0, 18.027756377319946);
        expect_single(0, 4, 0, 14.577379737113251);
        expect_single(1, 0, 0, 7.0710678118654755);
        expect_single(1, 3, 0, 11.180339887498949);
        expect_single(2, 5, 1, 9.7754802703857422);
        expect_single(5, 2, 1, 9.0138778686523438);
        expect_single(5, 6, 2, 37.165172576904297);
        expect_single(6, 5, 2, 16.787197113037109);
        assert!(model.transitions(2, 6).is_empty());
        assert!(model.transitions(3, 3).is_empty());
    }
}

mod full_solve {
    use super::*;

    #[test]
    fn total_order_identity_homogeneous() {
        let (tasks, precedence) = total_order_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let allocation = identity_allocation(3);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(&schedule, &[(5.0, 6.0), (6.0, 13.0), (13.0, 29.0)]);
        assert_close(schedule.makespan().value(), 29.0, "makespan");
        assert!(schedule.is_proven_optimal());
        assert_eq!(schedule.robot_sequences(), &[vec![0], vec![1], vec![2]]);
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn total_order_identity_colocated() {
        // Robots parked on their tasks: the pure precedence schedule.
        let (tasks, precedence) = total_order_plan();
        let fleet = colocated_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let allocation = identity_allocation(3);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(&schedule, &[(0.0, 1.0), (1.0, 8.0), (8.0, 24.0)]);
        assert_close(schedule.makespan().value(), 24.0, "makespan");
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn branch_identity_homogeneous() {
        let (tasks, precedence) = branch_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let allocation = identity_allocation(3);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(&schedule, &[(5.0, 6.0), (6.0, 13.0), (6.0, 22.0)]);
        assert_close(schedule.makespan().value(), 22.0, "makespan");
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn branch_identity_colocated() {
        let (tasks, precedence) = branch_plan();
        let fleet = colocated_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let schedule = solve(&inputs, &identity_allocation(3));
        assert_timepoints(&schedule, &[(0.0, 1.0), (1.0, 8.0), (1.0, 17.0)]);
        assert_close(schedule.makespan().value(), 17.0, "makespan");
    }

    #[test]
    fn diamond_identity_colocated() {
        let (tasks, precedence) = diamond_plan();
        let fleet = colocated_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let schedule = solve(&inputs, &identity_allocation(4));
        assert_timepoints(
            &schedule,
            &[(0.0, 1.0), (1.0, 8.0), (1.0, 17.0), (17.0, 19.0)],
        );
        assert_close(schedule.makespan().value(), 19.0, "makespan");
    }

    #[test]
    fn parallel_identity_colocated() {
        let (tasks, precedence) = parallel_plan();
        let fleet = colocated_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let schedule = solve(&inputs, &identity_allocation(4));
        assert_timepoints(
            &schedule,
            &[(0.0, 1.0), (1.0, 8.0), (0.0, 16.0), (16.0, 18.0)],
        );
        assert_close(schedule.makespan().value(), 18.0, "makespan");
    }

    #[test]
    fn complex_identity_colocated_homogeneous() {
        let (tasks, precedence) = complex_plan();
        let fleet = colocated_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let allocation = identity_allocation(7);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(
            &schedule,
            &[
                (0.0, 1.0),
                (1.0, 8.0),
                (5.7201895692, 21.7201895692),
                (21.7201895692, 23.7201895692),
                (23.7201895692, 32.3770438187),
                (0.0, 5.7201895692),
                (5.7201895692, 22.9906994004),
            ],
        );
        assert_close(schedule.makespan().value(), 32.3770438187, "makespan");
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn complex_identity_colocated_heterogeneous() {
        let (tasks, precedence) = complex_plan();
        let fleet = colocated_heterogeneous_fleet(&tasks);
        let inputs = scheduling_problem(tasks, &precedence, fleet);
        let schedule = solve(&inputs, &identity_allocation(7));
        assert_timepoints(
            &schedule,
            &[
                (0.0, 1.0),
                (1.0, 8.0),
                (5.7201895692, 19.220190),
                (19.220190, 21.220190),
                (21.220190, 28.934235),
                (0.0, 5.7201895692),
                (5.7201895692, 20.195614),
            ],
        );
        assert_close(schedule.makespan().value(), 28.934235, "makespan");
    }

    #[test]
    fn branch_multi_task_robot() {
        // Robot 0 does t1 then t3; the t1 -> t3 transition stretches the tail.
        let (tasks, precedence) = branch_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(2));
        let allocation = multi_task_robot_allocation(3);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(&schedule, &[(5.0, 6.0), (6.0, 13.0), (16.0, 32.0)]);
        assert_close(schedule.makespan().value(), 32.0, "makespan");
        assert_eq!(schedule.robot_sequences()[0], vec![0, 2]);
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn parallel_multi_task_robot_respects_mutex() {
        let (tasks, precedence) = parallel_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let allocation = multi_task_robot_allocation(4);
        let schedule = solve(&inputs, &allocation);
        assert_close(schedule.makespan().value(), 26.027756377, "makespan");
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn complex2_heterogeneous() {
        let (tasks, precedence) = complex_plan();
        let inputs = scheduling_problem(tasks, &precedence, heterogeneous_fleet(3));
        let allocation = complex2_allocation();
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(
            &schedule,
            &[
                (4.1667, 5.1667),
                (38.3339, 45.3339),
                (25.8339, 39.3339),
                (56.5142, 58.5142),
                (58.5142, 66.2283),
                (20.1137, 25.8339),
                (72.9266, 87.4020),
            ],
        );
        assert_close(schedule.makespan().value(), 87.4020, "makespan");
        assert_eq!(schedule.robot_sequences()[0], vec![0, 2, 6]);
        assert_eq!(schedule.robot_sequences()[1], vec![5, 1, 3]);
        assert_eq!(schedule.robot_sequences()[2], vec![2, 4]);
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }
}

mod variants {
    use super::*;
    use crate::problem::{MakespanBounds, Parameters};

    fn problem_with(parameters: Parameters) -> ProblemInputs {
        let (tasks, precedence) = total_order_plan();
        ProblemInputs::new(
            homogeneous_fleet(3),
            tasks,
            &precedence,
            MakespanBounds {
                best: 0.0,
                worst: 100.0,
            },
            parameters,
        )
        .unwrap()
    }

    #[test]
    fn plain_objective_reaches_the_same_makespan() {
        let mut parameters = Parameters::default();
        parameters.scheduler.use_hierarchical_objective = false;
        let inputs = problem_with(parameters);
        let schedule = solve(&inputs, &identity_allocation(3));
        assert_close(schedule.makespan().value(), 29.0, "makespan");
    }

    #[test]
    fn disabling_refinement_keeps_the_lower_bound_schedule() {
        // The straight-line planner makes the lower bounds exact, so the
        // single-solve variant matches the refined one.
        let mut parameters = Parameters::default();
        parameters.scheduler.compute_transition_duration_heuristic = false;
        let inputs = problem_with(parameters);
        let schedule = solve(&inputs, &identity_allocation(3));
        assert_timepoints(&schedule, &[(5.0, 6.0), (6.0, 13.0), (13.0, 29.0)]);
    }

    #[test]
    fn quick_mode_is_feasible_but_unproven() {
        let mut parameters = Parameters::default();
        parameters.scheduler.quick = true;
        let inputs = problem_with(parameters);
        let allocation = identity_allocation(3);
        let schedule = solve(&inputs, &allocation);
        assert!(!schedule.is_proven_optimal());
        assert_schedule_feasible(&inputs, &allocation, &schedule);
    }

    #[test]
    fn repeated_solves_are_identical() {
        let inputs = problem_with(Parameters::default());
        let allocation = identity_allocation(3);
        let first = solve(&inputs, &allocation);
        let second = solve(&inputs, &allocation);
        for (a, b) in first.timepoints().iter().zip(second.timepoints()) {
            assert!((a.start().value() - b.start().value()).abs() < 1e-9);
            assert!((a.finish().value() - b.finish().value()).abs() < 1e-9);
        }
        assert_eq!(first.robot_sequences(), second.robot_sequences());
    }
}

mod boundaries {
    use super::*;

    #[test]
    fn no_precedence_means_independent_timelines() {
        let (tasks, _) = total_order_plan();
        let inputs = scheduling_problem(tasks, &[], homogeneous_fleet(3));
        let schedule = solve(&inputs, &identity_allocation(3));
        // Every robot starts as soon as it arrives; the makespan is the
        // slowest depot transition plus execution.
        assert_timepoints(&schedule, &[(5.0, 6.0), (5.0, 12.0), (5.0, 21.0)]);
        assert_close(schedule.makespan().value(), 21.0, "makespan");
    }

    #[test]
    fn shared_site_tasks_reduce_to_pure_sequencing() {
        let site = se2(0.0, 0.0);
        let tasks = vec![task("a", 2.0, site, site), task("b", 3.0, site, site)];
        let robots = vec![Robot::new("r0", burger(), site)];
        let inputs = scheduling_problem(tasks, &[(0, 1)], robots);
        let allocation = Allocation::from_rows(&[vec![true], vec![true]]);
        let schedule = solve(&inputs, &allocation);
        assert_timepoints(&schedule, &[(0.0, 2.0), (2.0, 5.0)]);
        assert_eq!(schedule.robot_sequences()[0], vec![0, 1]);
    }

    #[test]
    fn unallocated_plan_is_a_simple_temporal_network() {
        let (tasks, precedence) = total_order_plan();
        let inputs = scheduling_problem(tasks, &precedence, homogeneous_fleet(3));
        let schedule = solve(&inputs, &Allocation::zeros(3, 3));
        assert_timepoints(&schedule, &[(0.0, 1.0), (1.0, 3.0), (3.0, 4.0)]);
    }

    #[test]
    fn empty_problem_solves_to_an_empty_schedule() {
        let inputs = scheduling_problem(vec![], &[], vec![]);
        let schedule = solve(&inputs, &Allocation::zeros(0, 0));
        assert!(schedule.timepoints().is_empty());
        assert_close(schedule.makespan().value(), 0.0, "makespan");
    }
}

mod failures {
    use super::*;
    use crate::geometry::UnreachablePlanner;
    use crate::team::Species;
    use std::sync::Arc;

    #[test]
    fn stranded_robot_makes_the_allocation_infeasible() {
        let stranded = Arc::new(Species::new(
            "stranded",
            vec![],
            0.2,
            0.2,
            Arc::new(UnreachablePlanner),
        ));
        let tasks = vec![task("t", 1.0, se2(5.0, 0.0), se2(6.0, 0.0))];
        let robots = vec![Robot::new("r0", stranded, se2(0.0, 0.0))];
        let inputs = scheduling_problem(tasks, &[], robots);
        let allocation = Allocation::from_rows(&[vec![true]]);
        let failure = MilpScheduler::new(&inputs)
            .solve(&allocation)
            .expect_err("no motion plan exists");
        assert!(matches!(failure, ScheduleFailure::MotionInfeasible { .. }));
        assert!(failure.is_recoverable());
    }
}

//! Solves a small branching mission end to end and prints the solution
//! JSON.
//!
//! Three tasks (`t1 -> {t2, t3}`), two kinds of robots, straight-line
//! motion planning. Run with `cargo run --example solve_branch`; set
//! `RUST_LOG=debug` to watch the search and the MILP refinement loop.

use itags::{load_problem, AllocationSearch, SolutionRecord};

const PROBLEM: &str = r#"{
    "motion_planners": [
        {"name": "warehouse", "type": "prm", "parameters": {"connection_range": 0.1}}
    ],
    "species": [
        {"name": "scout", "traits": [1.0, 0.0], "bounding_radius": 0.2,
         "speed": 0.5, "motion_planner": "warehouse"},
        {"name": "hauler", "traits": [0.0, 2.0], "bounding_radius": 0.4,
         "speed": 0.25, "motion_planner": "warehouse"}
    ],
    "robots": [
        {"name": "scout-1", "species": "scout",
         "initial_configuration": {"type": "se2", "x": 0.0, "y": 0.0}},
        {"name": "hauler-1", "species": "hauler",
         "initial_configuration": {"type": "se2", "x": 1.0, "y": 0.0}},
        {"name": "hauler-2", "species": "hauler",
         "initial_configuration": {"type": "se2", "x": 2.0, "y": 0.0}}
    ],
    "tasks": [
        {"name": "survey", "static_duration": 1.0, "desired_traits": [1.0, 0.0],
         "initial_configuration": {"type": "se2", "x": 0.0, "y": 1.0},
         "terminal_configuration": {"type": "se2", "x": 0.0, "y": 1.0}},
        {"name": "haul_a", "static_duration": 2.0, "desired_traits": [0.0, 2.0],
         "initial_configuration": {"type": "se2", "x": 1.0, "y": 1.0},
         "terminal_configuration": {"type": "se2", "x": 1.0, "y": 2.0}},
        {"name": "haul_b", "static_duration": 1.0, "desired_traits": [0.0, 4.0],
         "initial_configuration": {"type": "se2", "x": 2.0, "y": 1.0},
         "terminal_configuration": {"type": "se2", "x": 2.0, "y": 4.0}}
    ],
    "precedence": [[0, 1], [0, 2]],
    "makespan_bounds": {"best": 0.0, "worst": 120.0},
    "parameters": {"search": {"weight": 0.6}}
}"#;

fn main() {
    env_logger::init();

    let inputs = load_problem(PROBLEM).expect("demo problem is well formed");
    let report = AllocationSearch::new(&inputs)
        .run()
        .expect("solver backend available");

    println!(
        "popped {} nodes, generated {}, scheduled {}",
        report.stats.popped, report.stats.generated, report.stats.scheduled
    );
    match report.outcome.solution() {
        Some(solution) => {
            let record = SolutionRecord::from_solution(&inputs, solution);
            println!("{}", record.to_json().expect("solution serialises"));
        }
        None => println!("no feasible allocation (exit code {})", report.outcome.exit_code()),
    }
}

//! The JSON boundary: problem loading and solution output.
//!
//! The input schema references planners and species by name. Real planner
//! construction is the caller's concern ([`load_problem_with`] takes a
//! factory); [`load_problem`] backs every declared planner with the
//! straight-line reference implementation.

use std::collections::HashMap;
use std::sync::Arc;

use qtty::Quantity;
use serde::{Deserialize, Serialize};

use crate::geometry::{Configuration, MotionPlanner, StraightLinePlanner};
use crate::mission::Task;
use crate::search::Solution;
use crate::team::{Robot, Species};

use super::config::Parameters;
use super::error::InputError;
use super::inputs::{MakespanBounds, ProblemInputs};

/// Declared motion planner back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPlannerKind {
    Prm,
    Rrt,
}

/// One `motion_planners` entry. `environment` and `parameters` are passed
/// through opaquely to the planner factory.
#[derive(Debug, Clone, Deserialize)]
pub struct MotionPlannerSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MotionPlannerKind,
    #[serde(default)]
    pub environment: serde_json::Value,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SpeciesSpec {
    name: String,
    traits: Vec<f64>,
    bounding_radius: f64,
    speed: f64,
    motion_planner: String,
}

#[derive(Debug, Deserialize)]
struct RobotSpec {
    name: String,
    species: String,
    initial_configuration: Configuration,
}

#[derive(Debug, Deserialize)]
struct TaskSpec {
    name: String,
    static_duration: f64,
    desired_traits: Vec<f64>,
    initial_configuration: Configuration,
    terminal_configuration: Configuration,
}

#[derive(Debug, Deserialize)]
struct BoundsSpec {
    best: f64,
    worst: f64,
}

#[derive(Debug, Deserialize)]
struct ProblemFile {
    #[serde(default)]
    motion_planners: Vec<MotionPlannerSpec>,
    species: Vec<SpeciesSpec>,
    robots: Vec<RobotSpec>,
    tasks: Vec<TaskSpec>,
    #[serde(default)]
    precedence: Vec<(usize, usize)>,
    makespan_bounds: BoundsSpec,
    #[serde(default)]
    parameters: Parameters,
}

/// Loads a problem from JSON, constructing planners through `make_planner`.
///
/// # Errors
///
/// [`InputError::Json`] for schema violations, [`InputError::UnknownPlanner`]
/// / [`InputError::UnknownSpecies`] for dangling references, and any
/// validation error from [`ProblemInputs::new`].
pub fn load_problem_with<F>(json: &str, mut make_planner: F) -> Result<ProblemInputs, InputError>
where
    F: FnMut(&MotionPlannerSpec) -> Result<Arc<dyn MotionPlanner>, InputError>,
{
    let file: ProblemFile = serde_json::from_str(json)?;

    let mut planners: HashMap<&str, Arc<dyn MotionPlanner>> = HashMap::new();
    for spec in &file.motion_planners {
        planners.insert(spec.name.as_str(), make_planner(spec)?);
    }

    let mut species: HashMap<&str, Arc<Species>> = HashMap::new();
    for spec in &file.species {
        let planner = planners
            .get(spec.motion_planner.as_str())
            .cloned()
            .ok_or_else(|| InputError::UnknownPlanner {
                name: spec.motion_planner.clone(),
            })?;
        species.insert(
            spec.name.as_str(),
            Arc::new(Species::new(
                spec.name.clone(),
                spec.traits.clone(),
                spec.bounding_radius,
                spec.speed,
                planner,
            )),
        );
    }

    let robots = file
        .robots
        .iter()
        .map(|spec| {
            species
                .get(spec.species.as_str())
                .map(|s| Robot::new(spec.name.clone(), Arc::clone(s), spec.initial_configuration))
                .ok_or_else(|| InputError::UnknownSpecies {
                    name: spec.species.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tasks = file
        .tasks
        .iter()
        .map(|spec| {
            Task::new(
                spec.name.clone(),
                Quantity::new(spec.static_duration),
                spec.desired_traits.clone(),
                spec.initial_configuration,
                spec.terminal_configuration,
            )
        })
        .collect();

    ProblemInputs::new(
        robots,
        tasks,
        &file.precedence,
        MakespanBounds {
            best: file.makespan_bounds.best,
            worst: file.makespan_bounds.worst,
        },
        file.parameters,
    )
}

/// Loads a problem with the straight-line planner behind every declared
/// planner reference.
pub fn load_problem(json: &str) -> Result<ProblemInputs, InputError> {
    load_problem_with(json, |_| Ok(Arc::new(StraightLinePlanner)))
}

/// One `schedule` row of the solution output.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub task: String,
    pub start: f64,
    pub finish: f64,
}

/// The solution output object.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionRecord {
    pub allocation: Vec<Vec<bool>>,
    pub schedule: Vec<ScheduleEntry>,
    pub makespan: f64,
    pub traits_penalty: f64,
    pub nsq: f64,
    pub proven_optimal: bool,
}

impl SolutionRecord {
    pub fn from_solution(inputs: &ProblemInputs, solution: &Solution) -> Self {
        let allocation = (0..solution.allocation.num_tasks())
            .map(|task| {
                (0..solution.allocation.num_robots())
                    .map(|robot| solution.allocation.get(task, robot))
                    .collect()
            })
            .collect();
        let schedule = solution
            .schedule
            .timepoints()
            .iter()
            .enumerate()
            .map(|(task, timepoint)| ScheduleEntry {
                task: inputs.task(task).name().to_owned(),
                start: timepoint.start().value(),
                finish: timepoint.finish().value(),
            })
            .collect();
        Self {
            allocation,
            schedule,
            makespan: solution.schedule.makespan().value(),
            traits_penalty: solution.traits_penalty,
            nsq: solution.nsq,
            proven_optimal: solution.schedule.is_proven_optimal(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

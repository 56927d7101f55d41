//! Validated, immutable problem inputs shared by every component.

use crate::allocation::{
    satisfies_traits, traits_penalty, Allocation, TraitMatrix, TraitsReduction,
};
use crate::geometry::MotionCache;
use crate::mission::{PartialOrderPlan, Task};
use crate::team::Robot;

use super::config::Parameters;
use super::error::InputError;

/// Externally supplied makespan seeds for schedule-quality normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakespanBounds {
    pub best: f64,
    pub worst: f64,
}

/// Everything a solve reads: fleet, plan, trait matrices, configuration, and
/// the shared motion cache.
///
/// Construction validates shapes once; afterwards the inputs are read-only
/// and freely shared by the search driver, the scheduler, and the cache.
#[derive(Debug)]
pub struct ProblemInputs {
    robots: Vec<Robot>,
    tasks: Vec<Task>,
    plan: PartialOrderPlan,
    reduction: TraitsReduction,
    team_traits: TraitMatrix,
    desired_traits: TraitMatrix,
    makespan_bounds: MakespanBounds,
    parameters: Parameters,
    motion_cache: MotionCache,
}

impl ProblemInputs {
    /// Builds and validates problem inputs with the default (summing) trait
    /// reduction.
    ///
    /// # Errors
    ///
    /// Any [`InputError`] shape violation: inconsistent trait dimensions,
    /// negative durations, non-positive speeds, inverted makespan bounds, an
    /// out-of-range or cyclic precedence edge, or an out-of-range search
    /// weight.
    pub fn new(
        robots: Vec<Robot>,
        tasks: Vec<Task>,
        precedence: &[(usize, usize)],
        makespan_bounds: MakespanBounds,
        parameters: Parameters,
    ) -> Result<Self, InputError> {
        Self::with_reduction(
            robots,
            tasks,
            precedence,
            makespan_bounds,
            parameters,
            TraitsReduction::default(),
        )
    }

    /// As [`new`](Self::new), with an explicit trait reduction.
    pub fn with_reduction(
        robots: Vec<Robot>,
        tasks: Vec<Task>,
        precedence: &[(usize, usize)],
        makespan_bounds: MakespanBounds,
        parameters: Parameters,
        reduction: TraitsReduction,
    ) -> Result<Self, InputError> {
        let trait_dim = robots
            .first()
            .map(|r| r.traits().len())
            .or_else(|| tasks.first().map(|t| t.desired_traits().len()))
            .unwrap_or(0);

        for robot in &robots {
            let species = robot.species();
            if species.traits().len() != trait_dim {
                return Err(InputError::TraitLengthMismatch {
                    species: species.name().to_owned(),
                    got: species.traits().len(),
                    expected: trait_dim,
                });
            }
            if species.speed() <= 0.0 {
                return Err(InputError::NonPositiveSpeed {
                    species: species.name().to_owned(),
                    speed: species.speed(),
                });
            }
        }
        for task in &tasks {
            if task.desired_traits().len() != trait_dim {
                return Err(InputError::DesiredTraitLengthMismatch {
                    task: task.name().to_owned(),
                    got: task.desired_traits().len(),
                    expected: trait_dim,
                });
            }
            if task.static_duration().value() < 0.0 {
                return Err(InputError::NegativeDuration {
                    task: task.name().to_owned(),
                    duration: task.static_duration().value(),
                });
            }
        }
        if makespan_bounds.worst < makespan_bounds.best {
            return Err(InputError::InvalidMakespanBounds {
                best: makespan_bounds.best,
                worst: makespan_bounds.worst,
            });
        }
        let weight = parameters.search.weight;
        if !(0.0..=1.0).contains(&weight) {
            return Err(InputError::InvalidSearchWeight { weight });
        }
        if !reduction.reducers().is_empty() && reduction.reducers().len() != trait_dim {
            return Err(InputError::ReducerLengthMismatch {
                got: reduction.reducers().len(),
                expected: trait_dim,
            });
        }

        let plan = PartialOrderPlan::new(tasks.len(), precedence)?;
        let team_traits =
            TraitMatrix::from_rows(&robots.iter().map(|r| r.traits().to_vec()).collect::<Vec<_>>());
        let desired_traits = TraitMatrix::from_rows(
            &tasks
                .iter()
                .map(|t| t.desired_traits().to_vec())
                .collect::<Vec<_>>(),
        );

        Ok(Self {
            robots,
            tasks,
            plan,
            reduction,
            team_traits,
            desired_traits,
            makespan_bounds,
            parameters,
            motion_cache: MotionCache::new(),
        })
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn num_robots(&self) -> usize {
        self.robots.len()
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, index: usize) -> &Robot {
        &self.robots[index]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    pub fn plan(&self) -> &PartialOrderPlan {
        &self.plan
    }

    pub fn reduction(&self) -> &TraitsReduction {
        &self.reduction
    }

    pub fn team_traits(&self) -> &TraitMatrix {
        &self.team_traits
    }

    pub fn desired_traits(&self) -> &TraitMatrix {
        &self.desired_traits
    }

    pub fn makespan_bounds(&self) -> MakespanBounds {
        self.makespan_bounds
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn motion_cache(&self) -> &MotionCache {
        &self.motion_cache
    }

    /// Traits penalty of an allocation against this problem.
    pub fn traits_penalty(&self, allocation: &Allocation) -> f64 {
        traits_penalty(
            allocation,
            &self.reduction,
            &self.team_traits,
            &self.desired_traits,
        )
    }

    /// True when the allocation collectively satisfies every task.
    pub fn satisfies(&self, allocation: &Allocation) -> bool {
        satisfies_traits(
            allocation,
            &self.reduction,
            &self.team_traits,
            &self.desired_traits,
        )
    }
}

//! Solver configuration with spec defaults.

use serde::Deserialize;

/// Per-MILP-solve configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulerParameters {
    /// Wall-clock limit per MILP solve, in seconds.
    pub timeout: f64,
    /// Solver threads; 0 leaves the solver default.
    pub threads: u32,
    /// Lexicographic objective: minimum makespan, then earliest starts.
    pub use_hierarchical_objective: bool,
    /// When false the iterative refinement is skipped and the lower-bound
    /// transitions stand.
    pub compute_transition_duration_heuristic: bool,
    /// Accept the first feasible solution instead of proving optimality.
    pub quick: bool,
}

impl Default for SchedulerParameters {
    fn default() -> Self {
        Self {
            timeout: 1.0,
            threads: 0,
            use_hierarchical_objective: true,
            compute_transition_duration_heuristic: true,
            quick: false,
        }
    }
}

/// Best-first search configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    /// Weight of the traits penalty against the schedule quality in the
    /// node evaluation, in `[0, 1]`.
    pub weight: f64,
    /// Overall solve budget in seconds.
    pub global_deadline: f64,
    /// Optional incumbent bound: successors whose traits penalty exceeds it
    /// are discarded at generation.
    pub prune_penalty_above: Option<f64>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            weight: 0.5,
            global_deadline: f64::INFINITY,
            prune_penalty_above: None,
        }
    }
}

/// Motion-planner query configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionParameters {
    /// Per-edge planner budget in seconds; expiry marks the edge infeasible.
    pub timeout: f64,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self { timeout: 1.0 }
    }
}

/// All recognised configuration, grouped the way the input file nests it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub scheduler: SchedulerParameters,
    pub search: SearchParameters,
    pub motion: MotionParameters,
}

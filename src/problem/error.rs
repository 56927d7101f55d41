use thiserror::Error;

use crate::mission::PlanError;

/// Schema and shape violations in the problem inputs. Fatal.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("species `{species}` has {got} traits but the problem uses {expected}")]
    TraitLengthMismatch {
        species: String,
        got: usize,
        expected: usize,
    },

    #[error("task `{task}` desires {got} traits but the problem uses {expected}")]
    DesiredTraitLengthMismatch {
        task: String,
        got: usize,
        expected: usize,
    },

    #[error("task `{task}` has negative static duration {duration}")]
    NegativeDuration { task: String, duration: f64 },

    #[error("species `{species}` has non-positive speed {speed}")]
    NonPositiveSpeed { species: String, speed: f64 },

    #[error("makespan bounds are inverted (best {best}, worst {worst})")]
    InvalidMakespanBounds { best: f64, worst: f64 },

    #[error("search weight {weight} is outside [0, 1]")]
    InvalidSearchWeight { weight: f64 },

    #[error("reduction lists {got} column reducers but the problem uses {expected} traits")]
    ReducerLengthMismatch { got: usize, expected: usize },

    #[error("unknown species reference `{name}`")]
    UnknownSpecies { name: String },

    #[error("unknown motion planner reference `{name}`")]
    UnknownPlanner { name: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("malformed problem JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl InputError {
    /// Process exit code for malformed inputs.
    pub fn exit_code(&self) -> i32 {
        3
    }
}

use thiserror::Error;

/// Why the scheduler could not emit a proven schedule.
///
/// Everything except [`Solver`](Self::Solver) and
/// [`Internal`](Self::Internal) is recoverable: the search absorbs it as
/// "this allocation cannot be a solution" and moves on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleFailure {
    /// The MILP has no feasible point under the current constraints.
    #[error("no feasible schedule for this allocation")]
    Infeasible,

    /// A transition the timeline needs has no motion plan. `from_task` is
    /// `None` when the failing leg leaves the robot's initial configuration.
    #[error("robot {robot} has no motion plan for its transition into task {to_task}")]
    MotionInfeasible {
        robot: usize,
        to_task: usize,
        from_task: Option<usize>,
    },

    /// The solver hit its per-solve budget without any incumbent.
    #[error("MILP solver hit its {timeout}s limit with no incumbent")]
    TimeoutNoIncumbent { timeout: f64 },

    /// The solver backend failed outright. Fatal.
    #[error("MILP solver failed: {0}")]
    Solver(String),

    /// A solution violated a structural invariant. Indicates a bug. Fatal.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl ScheduleFailure {
    /// True for failures the search driver absorbs at the node level.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ScheduleFailure::Solver(_) | ScheduleFailure::Internal(_)
        )
    }
}

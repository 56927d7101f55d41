use thiserror::Error;

/// Errors raised by motion-planning queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    /// The planner proved (or gave up on) the configuration pair.
    #[error("no path between configurations for species `{species}`")]
    Unreachable { species: String },

    /// The planner hit its per-query budget. Poisons the cache like an
    /// unreachable pair; the scheduler marks the edge infeasible either way.
    #[error("motion planning for species `{species}` timed out after {timeout}s")]
    Timeout { species: String, timeout: f64 },

    /// The configuration pair has no common metric embedding and the planner
    /// cannot connect them.
    #[error("configurations have no common metric space")]
    NoMetricProjection,
}

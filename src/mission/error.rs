use thiserror::Error;

/// Errors raised while building a partial-order plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("precedence edge references task {index} but the plan has {len} tasks")]
    TaskIndexOutOfRange { index: usize, len: usize },

    #[error("precedence constraints contain a cycle")]
    CycleDetected,
}

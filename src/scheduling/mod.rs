//! Schedules, the per-candidate schedule model, and the iterative MILP
//! scheduler.

mod error;
mod milp;
mod model;
mod schedule;

#[cfg(test)]
mod tests;

pub use error::ScheduleFailure;
pub use milp::MilpScheduler;
pub use model::{ScheduleModel, Transition};
pub use schedule::{Schedule, Timepoint};

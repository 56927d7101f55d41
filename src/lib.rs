//! itags - Incremental Task Allocation Graph Search
//!
//! Trait-based task allocation for heterogeneous robot teams: a best-first
//! search over partial task-to-robot allocations, scored by how much of each
//! task's desired trait vector the assigned coalition still leaves unmet and
//! by the quality of a minimum-makespan schedule. Schedules come from an
//! iterative MILP whose task-to-task transition durations start as Euclidean
//! lower bounds and are lazily promoted to true motion-planning results.

pub mod allocation;
pub mod geometry;
pub mod mission;
pub mod problem;
pub mod scheduling;
pub mod search;
pub mod team;

#[cfg(test)]
mod fixtures;

pub use problem::{load_problem, ProblemInputs, SolutionRecord};
pub use scheduling::MilpScheduler;
pub use search::{AllocationSearch, SearchOutcome, Solution};

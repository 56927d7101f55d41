//! Configurations, motion-planner queries, and the shared travel cache.

mod cache;
mod configuration;
mod error;
mod planner;

pub use cache::MotionCache;
pub use configuration::{Configuration, ConfigurationKey};
pub use error::MotionError;
pub use planner::{MotionPlanner, StraightLinePlanner, UnreachablePlanner};

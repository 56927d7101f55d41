//! Motion-planner query seam.
//!
//! The real planners (PRM/RRT over an environment) live outside this crate;
//! the scheduler only consumes path lengths through [`MotionPlanner`].
//! [`StraightLinePlanner`] is the obstacle-free reference implementation used
//! by tests and demos.

use std::fmt::Debug;

use qtty::{Quantity, Second};

use super::configuration::Configuration;
use super::error::MotionError;

/// A geometric motion planner for a single body shape.
///
/// Implementations are shared between species via `Arc` and may be queried
/// from multiple threads; they are expected to serialise internally.
pub trait MotionPlanner: Send + Sync + Debug {
    /// Plans a path from `from` to `to` for a body of the given bounding
    /// radius and returns the path length in metres.
    ///
    /// # Errors
    ///
    /// [`MotionError::Unreachable`] when no path exists,
    /// [`MotionError::Timeout`] when the budget expires first.
    fn plan(
        &self,
        bounding_radius: f64,
        from: &Configuration,
        to: &Configuration,
        timeout: Quantity<Second>,
    ) -> Result<f64, MotionError>;
}

/// Planner that connects any two metric configurations by a straight segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLinePlanner;

impl MotionPlanner for StraightLinePlanner {
    fn plan(
        &self,
        _bounding_radius: f64,
        from: &Configuration,
        to: &Configuration,
        _timeout: Quantity<Second>,
    ) -> Result<f64, MotionError> {
        from.euclidean_distance(to)
            .ok_or(MotionError::NoMetricProjection)
    }
}

/// Planner that rejects every query. Test helper for unreachable fleets.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnreachablePlanner;

impl MotionPlanner for UnreachablePlanner {
    fn plan(
        &self,
        _bounding_radius: f64,
        _from: &Configuration,
        _to: &Configuration,
        _timeout: Quantity<Second>,
    ) -> Result<f64, MotionError> {
        Err(MotionError::Unreachable {
            species: String::new(),
        })
    }
}

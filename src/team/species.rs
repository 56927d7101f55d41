use std::sync::Arc;

use crate::geometry::MotionPlanner;

/// An equivalence class of robots: shared trait vector, body size, nominal
/// speed, and motion-planning model.
///
/// Two species with identical trait vectors may still differ in speed or
/// bounding radius, so they remain distinct.
#[derive(Debug, Clone)]
pub struct Species {
    name: String,
    traits: Vec<f64>,
    bounding_radius: f64,
    speed: f64,
    motion_planner: Arc<dyn MotionPlanner>,
}

impl Species {
    pub fn new(
        name: impl Into<String>,
        traits: Vec<f64>,
        bounding_radius: f64,
        speed: f64,
        motion_planner: Arc<dyn MotionPlanner>,
    ) -> Self {
        Self {
            name: name.into(),
            traits,
            bounding_radius,
            speed,
            motion_planner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn traits(&self) -> &[f64] {
        &self.traits
    }

    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    /// Nominal speed in metres per second. Divides path lengths into travel
    /// durations.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn motion_planner(&self) -> &Arc<dyn MotionPlanner> {
        &self.motion_planner
    }
}

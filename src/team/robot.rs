use std::sync::Arc;

use crate::geometry::Configuration;

use super::species::Species;

/// A single robot: a species instance parked at an initial configuration.
///
/// Immutable for the whole solve.
#[derive(Debug, Clone)]
pub struct Robot {
    name: String,
    species: Arc<Species>,
    initial_configuration: Configuration,
}

impl Robot {
    pub fn new(
        name: impl Into<String>,
        species: Arc<Species>,
        initial_configuration: Configuration,
    ) -> Self {
        Self {
            name: name.into(),
            species,
            initial_configuration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> &Arc<Species> {
        &self.species
    }

    pub fn initial_configuration(&self) -> &Configuration {
        &self.initial_configuration
    }

    /// The species trait vector. One row of the team traits matrix.
    pub fn traits(&self) -> &[f64] {
        self.species.traits()
    }

    pub fn speed(&self) -> f64 {
        self.species.speed()
    }
}

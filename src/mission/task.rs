use qtty::{Quantity, Second};

use crate::geometry::Configuration;

/// A geometric task in the partial-order plan.
///
/// Execution moves the coalition from the initial to the terminal
/// configuration; a "point-like" task keeps them equal.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    static_duration: Quantity<Second>,
    desired_traits: Vec<f64>,
    initial_configuration: Configuration,
    terminal_configuration: Configuration,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        static_duration: Quantity<Second>,
        desired_traits: Vec<f64>,
        initial_configuration: Configuration,
        terminal_configuration: Configuration,
    ) -> Self {
        Self {
            name: name.into(),
            static_duration,
            desired_traits,
            initial_configuration,
            terminal_configuration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time the task itself takes, excluding any traversal.
    pub fn static_duration(&self) -> Quantity<Second> {
        self.static_duration
    }

    pub fn desired_traits(&self) -> &[f64] {
        &self.desired_traits
    }

    pub fn initial_configuration(&self) -> &Configuration {
        &self.initial_configuration
    }

    pub fn terminal_configuration(&self) -> &Configuration {
        &self.terminal_configuration
    }

    /// True when initial and terminal configurations coincide.
    pub fn is_point_like(&self) -> bool {
        self.initial_configuration.key() == self.terminal_configuration.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_like_detection() {
        let at = Configuration::se2(1.0, 1.0);
        let point = Task::new("t", Quantity::new(1.0), vec![], at, at);
        assert!(point.is_point_like());

        let traversal = Task::new(
            "t",
            Quantity::new(1.0),
            vec![],
            at,
            Configuration::se2(1.0, 2.0),
        );
        assert!(!traversal.is_point_like());
    }
}

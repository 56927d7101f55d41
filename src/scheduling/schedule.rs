//! Emitted schedules.

use qtty::{Quantity, Second};

/// Start/finish pair for one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timepoint {
    start: Quantity<Second>,
    finish: Quantity<Second>,
}

impl Timepoint {
    pub fn new(start: Quantity<Second>, finish: Quantity<Second>) -> Self {
        Self { start, finish }
    }

    pub fn start(&self) -> Quantity<Second> {
        self.start
    }

    pub fn finish(&self) -> Quantity<Second> {
        self.finish
    }

    pub fn duration(&self) -> Quantity<Second> {
        self.finish - self.start
    }
}

/// A feasible schedule for one candidate allocation.
///
/// Besides the timepoints it records how the solver resolved each mutex pair
/// and the task order on every robot's timeline, so feasibility can be
/// audited without re-solving.
#[derive(Debug, Clone)]
pub struct Schedule {
    timepoints: Vec<Timepoint>,
    makespan: Quantity<Second>,
    decided_orderings: Vec<(usize, usize)>,
    robot_sequences: Vec<Vec<usize>>,
    proven_optimal: bool,
}

impl Schedule {
    pub(crate) fn new(
        timepoints: Vec<Timepoint>,
        decided_orderings: Vec<(usize, usize)>,
        robot_sequences: Vec<Vec<usize>>,
        proven_optimal: bool,
    ) -> Self {
        let makespan = timepoints
            .iter()
            .map(|tp| tp.finish().value())
            .fold(0.0, f64::max);
        Self {
            timepoints,
            makespan: Quantity::new(makespan),
            decided_orderings,
            robot_sequences,
            proven_optimal,
        }
    }

    /// One timepoint per task, task-index order.
    pub fn timepoints(&self) -> &[Timepoint] {
        &self.timepoints
    }

    pub fn makespan(&self) -> Quantity<Second> {
        self.makespan
    }

    /// Mutex pairs as the solver ordered them: `(i, j)` means task `i` was
    /// placed before task `j`.
    pub fn decided_orderings(&self) -> &[(usize, usize)] {
        &self.decided_orderings
    }

    /// Task visit order per robot; empty for robots without tasks.
    pub fn robot_sequences(&self) -> &[Vec<usize>] {
        &self.robot_sequences
    }

    /// False when the solver hit a limit and the schedule is only the best
    /// incumbent.
    pub fn is_proven_optimal(&self) -> bool {
        self.proven_optimal
    }

    pub(crate) fn mark_not_proven_optimal(&mut self) {
        self.proven_optimal = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn makespan_is_latest_finish() {
        let schedule = Schedule::new(
            vec![
                Timepoint::new(Quantity::new(0.0), Quantity::new(1.0)),
                Timepoint::new(Quantity::new(2.0), Quantity::new(9.0)),
                Timepoint::new(Quantity::new(3.0), Quantity::new(5.0)),
            ],
            vec![],
            vec![],
            true,
        );
        assert_eq!(schedule.makespan().value(), 9.0);
        assert!(schedule.is_proven_optimal());
    }

    #[test]
    fn empty_schedule_has_zero_makespan() {
        let schedule = Schedule::new(vec![], vec![], vec![], true);
        assert_eq!(schedule.makespan().value(), 0.0);
    }
}

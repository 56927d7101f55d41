//! The boolean task × robot assignment matrix.

use itertools::Itertools;

/// An M×N allocation: `get(i, r)` is true iff robot `r` is assigned to task
/// `i`.
///
/// # Examples
///
/// ```
/// use itags::allocation::Allocation;
///
/// let mut allocation = Allocation::zeros(2, 3);
/// allocation.set(0, 1, true);
/// allocation.set(1, 1, true);
///
/// assert!(allocation.get(0, 1));
/// assert_eq!(allocation.tasks_of(1).collect::<Vec<_>>(), vec![0, 1]);
/// // Tasks 0 and 1 share robot 1, so they are mutex candidates.
/// assert_eq!(allocation.shared_robot_pairs(), vec![(0, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    tasks: usize,
    robots: usize,
    cells: Vec<bool>,
}

impl Allocation {
    /// The empty allocation.
    pub fn zeros(tasks: usize, robots: usize) -> Self {
        Self {
            tasks,
            robots,
            cells: vec![false; tasks * robots],
        }
    }

    /// Builds an allocation from row-major boolean rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows are ragged. Intended for fixtures and loaders that
    /// have already validated their input.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let tasks = rows.len();
        let robots = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == robots),
            "allocation rows must have equal lengths"
        );
        Self {
            tasks,
            robots,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks
    }

    pub fn num_robots(&self) -> usize {
        self.robots
    }

    pub fn get(&self, task: usize, robot: usize) -> bool {
        self.cells[task * self.robots + robot]
    }

    pub fn set(&mut self, task: usize, robot: usize, assigned: bool) {
        self.cells[task * self.robots + robot] = assigned;
    }

    /// Robots assigned to `task`, in index order.
    pub fn assigned_robots(&self, task: usize) -> impl Iterator<Item = usize> + '_ {
        let row = &self.cells[task * self.robots..(task + 1) * self.robots];
        row.iter()
            .enumerate()
            .filter(|(_, &assigned)| assigned)
            .map(|(robot, _)| robot)
    }

    /// Tasks assigned to `robot`, in index order.
    pub fn tasks_of(&self, robot: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.tasks).filter(move |&task| self.get(task, robot))
    }

    /// Total number of assigned cells.
    pub fn count_assigned(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Unordered task pairs `(i, j)` with `i < j` sharing at least one robot.
    ///
    /// These are the mutex candidates; the scheduler drops the ones already
    /// ordered by precedence.
    pub fn shared_robot_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.tasks)
            .tuple_combinations()
            .filter(|&(i, j)| (0..self.robots).any(|r| self.get(i, r) && self.get(j, r)))
            .collect()
    }

    /// Row-major bit packing, the deduplication key for search nodes.
    pub fn packed(&self) -> AllocationKey {
        let mut bits = vec![0u64; self.cells.len().div_ceil(64)];
        for (index, &assigned) in self.cells.iter().enumerate() {
            if assigned {
                bits[index / 64] |= 1 << (index % 64);
            }
        }
        AllocationKey {
            bits: bits.into_boxed_slice(),
        }
    }
}

/// Packed identity of an allocation matrix.
///
/// Two allocations of the same dimensions have equal keys exactly when their
/// matrices are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocationKey {
    bits: Box<[u64]>,
}

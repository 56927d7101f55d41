//! Parent-linked search nodes over the allocation lattice.

use std::sync::Arc;

use super::matrix::Allocation;

/// A single-cell edit: assign `robot` to `task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Assignment {
    pub task: usize,
    pub robot: usize,
}

/// A node in the allocation search tree.
///
/// The root carries the matrix dimensions and an empty allocation; every
/// other node is its parent plus one [`Assignment`]. Nodes are immutable
/// after creation and shared by all their descendants, so the full matrix is
/// materialised on demand in O(depth) instead of being stored per node —
/// open sets can reach millions of nodes.
#[derive(Debug)]
pub struct AllocationNode {
    parent: Option<Arc<AllocationNode>>,
    assignment: Option<Assignment>,
    depth: usize,
    tasks: usize,
    robots: usize,
}

impl AllocationNode {
    /// The root node: an all-zero M×N allocation.
    pub fn root(tasks: usize, robots: usize) -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            assignment: None,
            depth: 0,
            tasks,
            robots,
        })
    }

    /// Child of `parent` with one more cell assigned.
    pub fn child(parent: &Arc<Self>, assignment: Assignment) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            assignment: Some(assignment),
            depth: parent.depth + 1,
            tasks: parent.tasks,
            robots: parent.robots,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The edit this node added, `None` for the root.
    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.tasks, self.robots)
    }

    /// Materialises the full allocation by walking the parent chain.
    pub fn allocation(&self) -> Allocation {
        let mut matrix = Allocation::zeros(self.tasks, self.robots);
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            if let Some(Assignment { task, robot }) = node.assignment {
                matrix.set(task, robot, true);
            }
            cursor = node.parent.as_deref();
        }
        matrix
    }

    /// Children toggling each still-unassigned cell, in (task, robot) order.
    ///
    /// The order is stable so identical runs expand identically.
    pub fn successors(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let matrix = self.allocation();
        let mut children = Vec::with_capacity(self.tasks * self.robots - self.depth);
        for task in 0..self.tasks {
            for robot in 0..self.robots {
                if !matrix.get(task, robot) {
                    children.push(Self::child(self, Assignment { task, robot }));
                }
            }
        }
        children
    }
}

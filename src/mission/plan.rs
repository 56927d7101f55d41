//! The partial-order plan over tasks.

use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};

use super::error::PlanError;

/// Precedence DAG over task indices.
///
/// # Invariants
///
/// - Edges reference valid task indices and never form a cycle; both are
///   enforced at construction.
/// - The task count and edge set are fixed afterwards: the scheduler derives
///   additional orderings from its own solutions but never writes them back.
#[derive(Debug, Clone)]
pub struct PartialOrderPlan {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
    edges: Vec<(usize, usize)>,
}

impl PartialOrderPlan {
    /// Builds a plan over `num_tasks` tasks with the given precedence edges.
    ///
    /// Duplicate edges are collapsed.
    ///
    /// # Errors
    ///
    /// [`PlanError::TaskIndexOutOfRange`] for an edge endpoint outside
    /// `0..num_tasks`, [`PlanError::CycleDetected`] when the edges are not a
    /// partial order.
    pub fn new(num_tasks: usize, edges: &[(usize, usize)]) -> Result<Self, PlanError> {
        let mut graph = DiGraph::with_capacity(num_tasks, edges.len());
        let nodes: Vec<NodeIndex> = (0..num_tasks).map(|i| graph.add_node(i)).collect();

        let mut kept: Vec<(usize, usize)> = Vec::with_capacity(edges.len());
        for &(from, to) in edges {
            for index in [from, to] {
                if index >= num_tasks {
                    return Err(PlanError::TaskIndexOutOfRange {
                        index,
                        len: num_tasks,
                    });
                }
            }
            if kept.contains(&(from, to)) {
                continue;
            }
            kept.push((from, to));
            graph.add_edge(nodes[from], nodes[to], ());
        }
        if is_cyclic_directed(&graph) {
            return Err(PlanError::CycleDetected);
        }
        kept.sort_unstable();

        Ok(Self {
            graph,
            nodes,
            edges: kept,
        })
    }

    /// Number of tasks in the plan.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The explicit precedence edges, sorted.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// True when a precedence path orders task `before` ahead of `after`.
    ///
    /// Transitive: `a → b → c` orders `(a, c)`. A task never orders itself.
    pub fn orders(&self, before: usize, after: usize) -> bool {
        before != after && has_path_connecting(&self.graph, self.nodes[before], self.nodes[after], None)
    }

    /// True when the pair is ordered in either direction.
    pub fn ordered_either_way(&self, a: usize, b: usize) -> bool {
        self.orders(a, b) || self.orders(b, a)
    }
}

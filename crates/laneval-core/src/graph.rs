//! Validator dependency graph and topological scheduling.
//!
//! Validators are nodes; an edge `A → B` means "B lists A as a
//! prerequisite", so A must be finalized before B's turn.
//!
//! Scheduling is Kahn's algorithm. Unlike a strict topological sort it
//! never fails: nodes that are never dequeued are returned as *excluded*.
//! That covers both cycles and prerequisites naming a validator that was
//! never declared, since a phantom prerequisite never decrements its
//! dependent's indegree.

use std::collections::{HashMap, VecDeque};

use crate::spec::{RunIndex, ValidatorRun};

/// Directed graph over the validator runs of one spec.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// `prerequisite → dependents`, dependents in declaration order.
    downstream: Vec<Vec<RunIndex>>,
    /// Number of declared prerequisite edges per node.
    indegree: Vec<usize>,
    /// Prerequisite names per node that resolve to no declared run.
    unresolved: Vec<Vec<String>>,
}

/// Result of scheduling a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    /// Every node after all of its prerequisites.
    pub order: Vec<RunIndex>,
    /// Nodes in a cycle, behind one, or with a dangling prerequisite.
    /// Declaration order.
    pub excluded: Vec<RunIndex>,
}

impl Schedule {
    pub fn is_excluded(&self, index: RunIndex) -> bool {
        self.excluded.contains(&index)
    }
}

impl DependencyGraph {
    /// Build the graph from runs in declaration order.
    pub fn build(runs: &[ValidatorRun]) -> Self {
        let by_name: HashMap<&str, RunIndex> = runs
            .iter()
            .enumerate()
            .map(|(idx, run)| (run.name(), idx))
            .collect();

        let mut downstream = vec![Vec::new(); runs.len()];
        let mut indegree = vec![0usize; runs.len()];
        let mut unresolved = vec![Vec::new(); runs.len()];

        for (idx, run) in runs.iter().enumerate() {
            for edge in run.prerequisites() {
                indegree[idx] += 1;
                match by_name.get(edge.target.as_str()) {
                    Some(&prereq) => downstream[prereq].push(idx),
                    None => unresolved[idx].push(edge.target.clone()),
                }
            }
        }

        Self {
            downstream,
            indegree,
            unresolved,
        }
    }

    pub fn len(&self) -> usize {
        self.indegree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indegree.is_empty()
    }

    pub fn indegree(&self, index: RunIndex) -> usize {
        self.indegree[index]
    }

    pub fn dependents_of(&self, index: RunIndex) -> &[RunIndex] {
        &self.downstream[index]
    }

    /// Prerequisite names of `index` that match no declared validator.
    pub fn unresolved_of(&self, index: RunIndex) -> &[String] {
        &self.unresolved[index]
    }

    /// Kahn's algorithm with declaration-order tie-breaking.
    ///
    /// Ready nodes are seeded in declaration order and dependents are
    /// released in declaration order, so the result is reproducible.
    pub fn schedule(&self) -> Schedule {
        let mut in_degree = self.indegree.clone();
        let mut queue: VecDeque<RunIndex> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(idx, _)| idx)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        let mut visited = vec![false; self.len()];

        while let Some(node) = queue.pop_front() {
            visited[node] = true;
            order.push(node);
            for &dependent in &self.downstream[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        let excluded = visited
            .iter()
            .enumerate()
            .filter(|(_, &seen)| !seen)
            .map(|(idx, _)| idx)
            .collect();

        Schedule { order, excluded }
    }
}

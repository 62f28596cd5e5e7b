use std::collections::{BTreeMap, BTreeSet};

use crate::error::ExecutorError;
use crate::plan::Plan;

/// Task dependency graph (DAG) keyed by task index.
///
/// Built incrementally: in streaming mode tasks arrive one by one, so every
/// insert validates against what is already present. Dependencies must point
/// at lower, already-inserted indices, which keeps the graph acyclic.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    /// Dependency edges: idx -> tasks it waits on
    pub edges: BTreeMap<u32, BTreeSet<u32>>,

    /// Reverse edges: idx -> tasks waiting on it
    pub reverse_edges: BTreeMap<u32, Vec<u32>>,
}

impl TaskGraph {
    /// Construct and validate a graph from a parsed plan.
    pub fn from_plan(plan: &Plan) -> Result<Self, ExecutorError> {
        let mut graph = Self::default();
        for task in plan.values() {
            graph.insert(task.idx, &task.dependencies)?;
        }
        Ok(graph)
    }

    pub fn insert(&mut self, idx: u32, dependencies: &BTreeSet<u32>) -> Result<(), ExecutorError> {
        if self.edges.contains_key(&idx) {
            return Err(ExecutorError::DuplicateTaskIdx(idx));
        }
        for &dep in dependencies {
            if dep >= idx {
                return Err(ExecutorError::InvalidDependency { task_idx: idx, dep });
            }
            if !self.edges.contains_key(&dep) {
                return Err(ExecutorError::DependencyNotFound {
                    task_idx: idx,
                    missing_dep: dep,
                });
            }
        }

        for &dep in dependencies {
            self.reverse_edges.entry(dep).or_default().push(idx);
        }
        self.edges.insert(idx, dependencies.clone());
        Ok(())
    }

    pub fn dependencies(&self, idx: u32) -> Option<&BTreeSet<u32>> {
        self.edges.get(&idx)
    }

    pub fn dependents(&self, idx: u32) -> &[u32] {
        self.reverse_edges.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Topological levels using Kahn's algorithm.
    ///
    /// Tasks in the same level have no path between them and can run in
    /// parallel; each level is sorted by index.
    pub fn topological_sort(&self) -> Vec<Vec<u32>> {
        let mut in_degree: BTreeMap<u32, usize> = self
            .edges
            .iter()
            .map(|(&idx, deps)| (idx, deps.len()))
            .collect();

        let mut stages = Vec::new();
        let mut current: Vec<u32> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&idx, _)| idx)
            .collect();

        while !current.is_empty() {
            let mut next = Vec::new();
            for &idx in &current {
                for &dependent in self.dependents(idx) {
                    if let Some(degree) = in_degree.get_mut(&dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.push(dependent);
                        }
                    }
                }
            }
            next.sort_unstable();
            stages.push(std::mem::replace(&mut current, next));
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(items: &[u32]) -> BTreeSet<u32> {
        items.iter().copied().collect()
    }

    fn diamond() -> TaskGraph {
        let mut graph = TaskGraph::default();
        graph.insert(1, &deps(&[])).unwrap();
        graph.insert(2, &deps(&[1])).unwrap();
        graph.insert(3, &deps(&[1])).unwrap();
        graph.insert(4, &deps(&[2, 3])).unwrap();
        graph.insert(5, &deps(&[1, 2, 3, 4])).unwrap();
        graph
    }

    #[test]
    fn test_topological_levels() {
        let graph = diamond();
        assert_eq!(graph.topological_sort(), vec![vec![1], vec![2, 3], vec![4], vec![5]]);
        assert_eq!(graph.dependents(1), &[2, 3, 5]);
    }

    #[test]
    fn test_independent_tasks_share_a_level() {
        let mut graph = TaskGraph::default();
        for idx in 1..=3 {
            graph.insert(idx, &deps(&[])).unwrap();
        }
        graph.insert(4, &deps(&[1, 2, 3])).unwrap();
        assert_eq!(graph.topological_sort(), vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn test_duplicate_idx() {
        let mut graph = diamond();
        assert!(matches!(
            graph.insert(3, &deps(&[])),
            Err(ExecutorError::DuplicateTaskIdx(3))
        ));
    }

    #[test]
    fn test_missing_and_forward_dependencies() {
        let mut graph = TaskGraph::default();
        graph.insert(1, &deps(&[])).unwrap();
        assert!(matches!(
            graph.insert(3, &deps(&[2])),
            Err(ExecutorError::DependencyNotFound { task_idx: 3, missing_dep: 2 })
        ));
        assert!(matches!(
            graph.insert(2, &deps(&[2])),
            Err(ExecutorError::InvalidDependency { task_idx: 2, dep: 2 })
        ));
    }
}

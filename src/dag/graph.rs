// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::dag::task::{Task, TaskSpec};

/// Internal adjacency for one task, by index into `TaskGraph::tasks`.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Resolved dependencies. A title listed twice yields two entries.
    deps: Vec<usize>,
    /// Tasks that list this one as a dependency.
    dependents: Vec<usize>,
}

/// In-memory task set with dependency edges resolved by title.
///
/// Nothing is validated here: unknown dependency titles are simply dropped
/// from the edge set, duplicate titles resolve to the first task carrying
/// them, and cycles are kept as-is (the scheduler leaves them out of the
/// execution order).
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    nodes: Vec<DagNode>,
    title_index: HashMap<String, usize>,
}

impl TaskGraph {
    /// Build the graph, assigning `task_<n>` ids in discovery order.
    pub fn build(specs: impl IntoIterator<Item = TaskSpec>) -> Self {
        let mut tasks = Vec::new();
        let mut title_index: HashMap<String, usize> = HashMap::new();

        for (idx, spec) in specs.into_iter().enumerate() {
            // First match wins for duplicate titles.
            title_index.entry(spec.title.clone()).or_insert(idx);
            tasks.push(Task::from_spec(format!("task_{}", idx + 1), spec));
        }

        let mut nodes = vec![DagNode::default(); tasks.len()];
        for (idx, task) in tasks.iter().enumerate() {
            for title in &task.dependencies {
                if let Some(&dep) = title_index.get(title) {
                    nodes[idx].deps.push(dep);
                    nodes[dep].dependents.push(idx);
                }
            }
        }

        Self {
            tasks,
            nodes,
            title_index,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn task(&self, idx: usize) -> &Task {
        &self.tasks[idx]
    }

    pub fn task_mut(&mut self, idx: usize) -> &mut Task {
        &mut self.tasks[idx]
    }

    /// Index of the task with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Resolve a dependency title to the first task carrying it.
    pub fn resolve(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    /// Resolved dependencies of a task (unknown titles are absent).
    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        self.nodes
            .get(idx)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks that depend on the given one.
    pub fn dependents_of(&self, idx: usize) -> &[usize] {
        self.nodes
            .get(idx)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks that sit on a dependency cycle (including self-dependencies).
    ///
    /// Used for diagnostics only; tasks downstream of a cycle are
    /// unschedulable too but are not reported here.
    pub fn cycle_members(&self) -> Vec<usize> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let indices: Vec<NodeIndex> = (0..self.tasks.len()).map(|i| graph.add_node(i)).collect();

        for (idx, node) in self.nodes.iter().enumerate() {
            for &dep in &node.deps {
                graph.add_edge(indices[dep], indices[idx], ());
            }
        }

        let mut members: Vec<usize> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.nodes[graph[scc[0]]].deps.contains(&graph[scc[0]])
            })
            .flatten()
            .map(|n| graph[n])
            .collect();
        members.sort_unstable();
        members
    }
}

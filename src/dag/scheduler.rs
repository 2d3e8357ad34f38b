// src/dag/scheduler.rs

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;

/// Compute a dependency-respecting execution order.
///
/// Kahn's algorithm over `dependency -> dependent` edges. Before every pop the
/// ready set is sorted by ascending priority; the sort is stable, so tasks of
/// equal priority keep the order in which they became ready.
///
/// Tasks on (or downstream of) a dependency cycle never reach in-degree zero
/// and are silently absent from the result. Callers treat absence as
/// "unschedulable"; see [`unschedulable`].
pub fn order(graph: &TaskGraph) -> Vec<usize> {
    let mut in_degree: Vec<usize> = (0..graph.len())
        .map(|idx| graph.dependencies_of(idx).len())
        .collect();

    let mut ready: Vec<usize> = (0..graph.len()).filter(|&idx| in_degree[idx] == 0).collect();
    let mut sorted = Vec::with_capacity(graph.len());

    while !ready.is_empty() {
        ready.sort_by_key(|&idx| graph.task(idx).priority);
        let current = ready.remove(0);
        sorted.push(current);

        for &dependent in graph.dependents_of(current) {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    debug!(
        scheduled = sorted.len(),
        total = graph.len(),
        "scheduler: computed execution order"
    );

    sorted
}

/// Tasks that `order` left out, in discovery order.
pub fn unschedulable(graph: &TaskGraph, order: &[usize]) -> Vec<usize> {
    let scheduled: HashSet<usize> = order.iter().copied().collect();
    let missing: Vec<usize> = (0..graph.len()).filter(|idx| !scheduled.contains(idx)).collect();

    if !missing.is_empty() {
        let titles: Vec<&str> = missing.iter().map(|&i| graph.task(i).title.as_str()).collect();
        warn!(?titles, "tasks left out of the execution order (dependency cycle)");
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::TaskSpec;

    fn spec(title: &str, priority: i64, deps: &[&str]) -> TaskSpec {
        let mut s = TaskSpec::new(title);
        s.priority = priority;
        s.dependencies = deps.iter().map(|d| d.to_string()).collect();
        s
    }

    fn titles(graph: &TaskGraph, order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| graph.task(i).title.clone()).collect()
    }

    #[test]
    fn equal_priorities_keep_discovery_order() {
        let graph = TaskGraph::build(vec![spec("x", 3, &[]), spec("y", 3, &[]), spec("z", 3, &[])]);
        assert_eq!(titles(&graph, &order(&graph)), vec!["x", "y", "z"]);
    }

    #[test]
    fn newly_ready_tasks_compete_with_existing_ready_set() {
        // `b` becomes ready after `a` and outranks the waiting `c`.
        let graph = TaskGraph::build(vec![
            spec("a", 1, &[]),
            spec("c", 5, &[]),
            spec("b", 2, &["a"]),
        ]);
        assert_eq!(titles(&graph, &order(&graph)), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_dependency_titles_still_schedule() {
        let graph = TaskGraph::build(vec![spec("a", 1, &[]), spec("b", 1, &["a", "a"])]);
        assert_eq!(titles(&graph, &order(&graph)), vec!["a", "b"]);
    }

    #[test]
    fn cycle_and_downstream_are_unschedulable() {
        let graph = TaskGraph::build(vec![
            spec("ok", 1, &[]),
            spec("p", 1, &["q"]),
            spec("q", 1, &["p"]),
            spec("after_cycle", 1, &["p"]),
        ]);
        let order = order(&graph);
        assert_eq!(titles(&graph, &order), vec!["ok"]);
        assert_eq!(unschedulable(&graph, &order), vec![1, 2, 3]);
    }
}

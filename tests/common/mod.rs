#![allow(dead_code)]

use agent_collab::dag::{TaskGraph, TaskStatus};
use agent_collab::engine::Dispatcher;
use agent_collab_test_utils::{FakeWorkerClient, registry_for};

/// Titles of the tasks at the given indices.
pub fn titles(graph: &TaskGraph, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&idx| graph.task(idx).title.clone())
        .collect()
}

/// Status of the first task carrying `title`.
pub fn status_of(graph: &TaskGraph, title: &str) -> TaskStatus {
    let idx = graph
        .resolve(title)
        .unwrap_or_else(|| panic!("no task titled '{title}'"));
    graph.task(idx).status
}

/// Dispatcher over `graph` with one fake worker per owner name.
pub fn dispatcher(
    graph: TaskGraph,
    workers: &[&str],
    client: &FakeWorkerClient,
) -> Dispatcher<FakeWorkerClient> {
    Dispatcher::new(graph, registry_for(workers), client.clone())
}

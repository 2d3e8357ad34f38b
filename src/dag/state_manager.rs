// src/dag/state_manager.rs

//! Status transitions and eligibility checks over a [`TaskGraph`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task::{Task, TaskStatus};

/// Forward-only rank of a status; transitions may never lower it.
fn rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::NotStarted => 0,
        TaskStatus::Assigned => 1,
        TaskStatus::InProgress => 2,
        TaskStatus::Completed | TaskStatus::Failed => 3,
    }
}

/// Mutating view used by the dispatcher and the poller.
pub struct StateManager<'a> {
    graph: &'a mut TaskGraph,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a mut TaskGraph) -> Self {
        Self { graph }
    }

    /// Move a task to `to`, refusing backward or sideways moves out of a
    /// terminal status. Returns whether the status changed.
    pub fn advance(&mut self, idx: usize, to: TaskStatus) -> bool {
        let task = self.graph.task_mut(idx);
        let from = task.status;

        if from == to {
            return false;
        }
        if from.is_terminal() || rank(to) < rank(from) {
            warn!(
                task = %task.id,
                from = %from,
                to = %to,
                "refusing backward status transition"
            );
            return false;
        }

        debug!(task = %task.id, from = %from, to = %to, "task status transition");
        task.status = to;
        true
    }

    pub fn mark_assigned(&mut self, idx: usize) -> bool {
        self.advance(idx, TaskStatus::Assigned)
    }

    pub fn mark_in_progress(&mut self, idx: usize) -> bool {
        self.advance(idx, TaskStatus::InProgress)
    }

    /// Mark a task `Completed` and store its outcome text.
    pub fn mark_completed(&mut self, idx: usize, result: String) -> bool {
        let changed = self.advance(idx, TaskStatus::Completed);
        if changed {
            self.graph.task_mut(idx).result = Some(result);
        }
        changed
    }

    /// Mark a task `Failed`, keeping the worker's error as its result.
    pub fn mark_failed(&mut self, idx: usize, error: String) -> bool {
        let changed = self.advance(idx, TaskStatus::Failed);
        if changed {
            self.graph.task_mut(idx).result = Some(error);
        }
        changed
    }

    /// Tracked tasks that are `NotStarted` and whose dependencies are all
    /// `Completed`, in the given (execution) order.
    pub fn collect_assignable(&self, tracked: &[usize]) -> Vec<usize> {
        let ro = ReadOnlyStateManager::new(&*self.graph);
        tracked
            .iter()
            .copied()
            .filter(|&idx| ro.graph.task(idx).status == TaskStatus::NotStarted && ro.can_assign(idx))
            .collect()
    }
}

/// Read-only checks that only need shared access to the graph.
pub struct ReadOnlyStateManager<'a> {
    graph: &'a TaskGraph,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self { graph }
    }

    /// True iff every dependency title that resolves to a task in the graph
    /// points at a `Completed` task. Titles that resolve to nothing never
    /// block.
    pub fn can_assign(&self, idx: usize) -> bool {
        let task = self.graph.task(idx);
        task.dependencies.iter().all(|title| match self.graph.resolve(title) {
            Some(dep) => self.graph.task(dep).status == TaskStatus::Completed,
            None => true,
        })
    }

    /// True iff every tracked task is `Completed`.
    pub fn all_completed(&self, tracked: &[usize]) -> bool {
        tracked
            .iter()
            .all(|&idx| self.graph.task(idx).status == TaskStatus::Completed)
    }

    /// Counts per status plus one row per task, in discovery order.
    pub fn summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total_tasks: self.graph.len(),
            ..StatusSummary::default()
        };

        for task in self.graph.tasks() {
            match task.status {
                TaskStatus::Completed => summary.completed += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Assigned => summary.assigned += 1,
                TaskStatus::NotStarted => summary.not_started += 1,
                TaskStatus::Failed => summary.failed += 1,
            }
            summary.tasks.push(TaskSummary::from(task));
        }

        summary
    }
}

/// Snapshot of a whole session's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total_tasks: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub assigned: usize,
    pub not_started: usize,
    pub failed: usize,
    pub tasks: Vec<TaskSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub agent: String,
    pub status: TaskStatus,
    pub result: Option<String>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            agent: task.owner.clone(),
            status: task.status,
            result: task.result.clone(),
        }
    }
}

impl TaskSummary {
    /// One-line rendering used by the CLI, e.g. `[completed] setup (developer)`.
    pub fn line(&self) -> String {
        format!("[{}] {} ({})", self.status, self.title, self.agent)
    }
}

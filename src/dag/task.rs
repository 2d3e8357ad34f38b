// src/dag/task.rs

//! Task records and their lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::TaskPayload;
use crate::types::AgentName;

/// Canonical task identifier (`task_<n>`, assigned once at graph-build time).
pub type TaskId = String;

/// Priority used when a task list entry does not specify one.
pub const DEFAULT_PRIORITY: i64 = 5;

/// Agent used when a task list entry does not specify one.
pub const DEFAULT_AGENT: &str = "developer";

/// Task type sent to workers when none is known.
pub const DEFAULT_TASK_KIND: &str = "generic";

/// Lifecycle of a task on the orchestrator side.
///
/// Transitions only move forward:
/// `NotStarted -> Assigned -> InProgress -> Completed`, with `Failed` reached
/// only when a worker reports an execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    Assigned,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input record for graph construction, as produced by the task list parser
/// or by the configured task types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub title: String,
    pub description: String,
    pub owner: AgentName,
    pub priority: i64,
    /// Raw dependency titles; they are resolved lazily against the graph.
    pub dependencies: Vec<String>,
    pub kind: String,
}

impl TaskSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            owner: DEFAULT_AGENT.to_string(),
            priority: DEFAULT_PRIORITY,
            dependencies: Vec::new(),
            kind: DEFAULT_TASK_KIND.to_string(),
        }
    }
}

/// A task inside the [`TaskGraph`](crate::dag::TaskGraph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub owner: AgentName,
    pub priority: i64,
    pub dependencies: Vec<String>,
    pub kind: String,
    pub status: TaskStatus,
    pub result: Option<String>,
}

impl Task {
    pub fn from_spec(id: TaskId, spec: TaskSpec) -> Self {
        Self {
            id,
            title: spec.title,
            description: spec.description,
            owner: spec.owner,
            priority: spec.priority,
            dependencies: spec.dependencies,
            kind: spec.kind,
            status: TaskStatus::NotStarted,
            result: None,
        }
    }

    /// Body sent to the owning worker on submission.
    pub fn payload(&self) -> TaskPayload {
        TaskPayload {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            task_type: self.kind.clone(),
            priority: self.priority,
        }
    }
}

// src/protocol.rs

//! JSON bodies exchanged between the orchestrator and worker processes.
//!
//! | Method/Path   | Request         | Response                                   |
//! |---------------|-----------------|--------------------------------------------|
//! | `GET /health` | -               | [`HealthResponse`]                         |
//! | `GET /status` | -               | [`StatusResponse`]                         |
//! | `POST /task`  | [`TaskPayload`] | [`TaskReply`] (200 completed / 500 failed) |
//! | `GET /results`| -               | [`ResultsResponse`]                        |

use serde::{Deserialize, Serialize};

use crate::dag::TaskId;
use crate::types::{AgentName, WorkerStatus};

/// Task body submitted with `POST /task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_task_type")]
    pub task_type: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_task_type() -> String {
    crate::dag::DEFAULT_TASK_KIND.to_string()
}

fn default_priority() -> i64 {
    crate::dag::DEFAULT_PRIORITY
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent: AgentName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub name: AgentName,
    pub role: String,
    pub status: WorkerStatus,
    pub current_task: Option<TaskPayload>,
    pub completed_tasks: usize,
}

impl StatusResponse {
    /// The worker has nothing in flight, so its result log is up to date.
    pub fn is_idle(&self) -> bool {
        self.current_task.is_none() || self.status == WorkerStatus::Idle
    }
}

/// Reply to `POST /task`, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskReply {
    Completed { result: String },
    Failed { error: String },
}

/// Terminal state recorded in a worker's result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Completed,
    Failed,
}

/// One append-only entry of a worker's result log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLogEntry {
    pub task: TaskPayload,
    pub result: String,
    pub status: ResultStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub agent: AgentName,
    pub results: Vec<ResultLogEntry>,
}

impl ResultsResponse {
    /// Linear search for the log entry of a given task id.
    pub fn entry_for(&self, task_id: &str) -> Option<&ResultLogEntry> {
        self.results.iter().find(|entry| entry.task.id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_payload_uses_type_key_and_defaults() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"id":"task_1","title":"setup"}"#).unwrap();
        assert_eq!(payload.task_type, "generic");
        assert_eq!(payload.priority, 5);
        assert_eq!(payload.description, "");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "generic");
    }

    #[test]
    fn task_reply_is_tagged_by_status() {
        let ok = serde_json::to_value(TaskReply::Completed {
            result: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"status": "completed", "result": "ok"}));

        let failed: TaskReply =
            serde_json::from_str(r#"{"status":"failed","error":"boom"}"#).unwrap();
        assert_eq!(
            failed,
            TaskReply::Failed {
                error: "boom".to_string()
            }
        );
    }
}

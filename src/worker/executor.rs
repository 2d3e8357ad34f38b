// src/worker/executor.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::Result;
use crate::protocol::{
    HealthResponse, ResultLogEntry, ResultStatus, ResultsResponse, StatusResponse, TaskPayload,
};
use crate::types::{AgentName, AgentRole, WorkerStatus};
use crate::worker::runner::CodeRunner;
use crate::workspace::agent_dir;

#[derive(Debug, Default)]
struct WorkerState {
    status: WorkerStatus,
    current_task: Option<TaskPayload>,
    results: Vec<ResultLogEntry>,
}

/// Per-worker task state machine.
///
/// `Idle -> Working -> Idle` on success and `Working -> Error` on failure;
/// the next submission moves `Error -> Working`. The state lock is released
/// while the task runs, so `/status` and `/results` stay responsive.
///
/// Submissions are not serialized here. The orchestrator only ever sends a
/// worker one task at a time.
#[derive(Clone)]
pub struct TaskExecutor {
    name: AgentName,
    role: AgentRole,
    agent_workspace: PathBuf,
    runner: Arc<dyn CodeRunner>,
    state: Arc<Mutex<WorkerState>>,
}

impl TaskExecutor {
    /// Create the executor and its `agent_<name>` directory under `workspace`.
    pub async fn new(
        name: impl Into<AgentName>,
        role: AgentRole,
        workspace: &Path,
        runner: Arc<dyn CodeRunner>,
    ) -> Result<Self> {
        let name = name.into();
        let agent_workspace = agent_dir(workspace, &name);
        tokio::fs::create_dir_all(&agent_workspace).await?;
        info!(agent = %name, role = %role, "worker initialised");

        Ok(Self {
            name,
            role,
            agent_workspace,
            runner,
            state: Arc::new(Mutex::new(WorkerState::default())),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn agent_workspace(&self) -> &Path {
        &self.agent_workspace
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            agent: self.name.clone(),
        }
    }

    pub async fn status(&self) -> StatusResponse {
        let state = self.state.lock().await;
        StatusResponse {
            name: self.name.clone(),
            role: self.role.as_tag().to_string(),
            status: state.status,
            current_task: state.current_task.clone(),
            completed_tasks: state.results.len(),
        }
    }

    pub async fn results(&self) -> ResultsResponse {
        let state = self.state.lock().await;
        ResultsResponse {
            agent: self.name.clone(),
            results: state.results.clone(),
        }
    }

    /// Execute one task through the role handler.
    ///
    /// Only successes are appended to the result log.
    pub async fn execute(&self, task: TaskPayload) -> Result<String> {
        info!(agent = %self.name, task = %task.id, title = %task.title, "received task");
        {
            let mut state = self.state.lock().await;
            state.status = WorkerStatus::Working;
            state.current_task = Some(task.clone());
        }

        let outcome = self
            .role
            .handle(&task, &self.agent_workspace, self.runner.as_ref())
            .await;

        let mut state = self.state.lock().await;
        state.current_task = None;
        match outcome {
            Ok(result) => {
                state.status = WorkerStatus::Idle;
                state.results.push(ResultLogEntry {
                    task,
                    result: result.clone(),
                    status: ResultStatus::Completed,
                });
                info!(agent = %self.name, completed = state.results.len(), "task completed");
                Ok(result)
            }
            Err(err) => {
                state.status = WorkerStatus::Error;
                error!(agent = %self.name, task = %task.id, error = %err, "task execution failed");
                Err(err)
            }
        }
    }
}

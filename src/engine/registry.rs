// src/engine/registry.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::TaskId;
use crate::types::{AgentName, AgentRole, Liveness, WorkerStatus};

/// What the orchestrator knows about one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    pub name: AgentName,
    pub role: AgentRole,
    /// Base URL, e.g. `http://localhost:8001`.
    pub endpoint: String,
    pub liveness: Liveness,
    pub last_reported_status: WorkerStatus,
    /// Task submitted to this worker and not yet seen completed.
    pub current_task_id: Option<TaskId>,
}

impl WorkerRecord {
    pub fn new(name: impl Into<AgentName>, role: AgentRole, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            endpoint: endpoint.into(),
            liveness: Liveness::Starting,
            last_reported_status: WorkerStatus::Idle,
            current_task_id: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_task_id.is_some()
    }
}

/// Worker name -> record, owned by the orchestrator for one session.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    workers: BTreeMap<AgentName, WorkerRecord>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a worker record.
    pub fn register(&mut self, record: WorkerRecord) {
        debug!(agent = %record.name, endpoint = %record.endpoint, "registering worker");
        self.workers.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&WorkerRecord> {
        self.workers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &AgentName> {
        self.workers.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &WorkerRecord> {
        self.workers.values()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn set_liveness(&mut self, name: &str, liveness: Liveness) {
        if let Some(record) = self.workers.get_mut(name) {
            record.liveness = liveness;
        }
    }

    pub fn set_reported_status(&mut self, name: &str, status: WorkerStatus) {
        if let Some(record) = self.workers.get_mut(name) {
            record.last_reported_status = status;
        }
    }

    /// Record that `task` has been submitted to `name`.
    pub fn mark_busy(&mut self, name: &str, task: &str) {
        if let Some(record) = self.workers.get_mut(name) {
            record.current_task_id = Some(task.to_string());
        }
    }

    /// Forget the in-flight task of `name`, but only if it is `task`.
    pub fn clear(&mut self, name: &str, task: &str) {
        if let Some(record) = self.workers.get_mut(name) {
            if record.current_task_id.as_deref() == Some(task) {
                record.current_task_id = None;
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<WorkerRecord> {
        self.workers.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_only_releases_the_matching_task() {
        let mut registry = AgentRegistry::new();
        registry.register(WorkerRecord::new(
            "developer",
            AgentRole::CodeImplementation,
            "http://localhost:8001",
        ));

        registry.mark_busy("developer", "task_1");
        registry.clear("developer", "task_2");
        assert!(registry.get("developer").unwrap().is_busy());

        registry.clear("developer", "task_1");
        assert!(!registry.get("developer").unwrap().is_busy());
    }

    #[test]
    fn updates_to_unknown_workers_are_ignored() {
        let mut registry = AgentRegistry::new();
        registry.set_liveness("ghost", Liveness::Ready);
        registry.mark_busy("ghost", "task_1");
        assert!(registry.is_empty());
    }
}

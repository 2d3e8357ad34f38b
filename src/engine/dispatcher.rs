// src/engine/dispatcher.rs

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::client::{SubmitOutcome, WorkerClient};
use crate::dag::{
    ReadOnlyStateManager, StateManager, StatusSummary, TaskGraph, TaskStatus, order,
    unschedulable,
};
use crate::errors::{CollabError, Result};
use crate::types::{Liveness, WorkerStatus};

use super::registry::AgentRegistry;

/// What happened to a task handed to [`Dispatcher::assign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The worker acknowledged the task; the poller will pick up completion.
    InProgress,
    /// The worker finished the task inside the submission request.
    Completed,
    /// The worker reported that executing the task failed.
    Failed,
    /// The owning worker already has a task in flight; try again later.
    OwnerBusy,
}

/// Decides when tasks may run and submits them to their owning workers.
///
/// The dispatcher owns the task graph and the agent registry for a session.
/// All mutation happens through `&mut self`, so one control flow drives both
/// dispatch and polling without locks.
pub struct Dispatcher<C: WorkerClient> {
    graph: TaskGraph,
    /// Execution order, computed once. Tasks outside it (cycles and anything
    /// downstream of one) are untracked.
    order: Vec<usize>,
    registry: AgentRegistry,
    client: C,
}

impl<C: WorkerClient> fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("order", &self.order)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<C: WorkerClient> Dispatcher<C> {
    pub fn new(graph: TaskGraph, registry: AgentRegistry, client: C) -> Self {
        let order = order(&graph);
        // Logged there; untracked tasks are simply never assigned.
        unschedulable(&graph, &order);

        Self {
            graph,
            order,
            registry,
            client,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Tracked task indices in execution order.
    pub fn tracked(&self) -> &[usize] {
        &self.order
    }

    pub fn status_of(&self, idx: usize) -> TaskStatus {
        self.graph.task(idx).status
    }

    pub fn can_assign(&self, idx: usize) -> bool {
        ReadOnlyStateManager::new(&self.graph).can_assign(idx)
    }

    pub fn all_completed(&self) -> bool {
        ReadOnlyStateManager::new(&self.graph).all_completed(&self.order)
    }

    pub fn summary(&self) -> StatusSummary {
        ReadOnlyStateManager::new(&self.graph).summary()
    }

    /// Tracked tasks currently `InProgress`, in execution order.
    pub fn in_progress(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| self.graph.task(idx).status == TaskStatus::InProgress)
            .collect()
    }

    /// Top-level assignment pass: try every tracked task in order, skipping
    /// the ones that are not eligible yet.
    pub async fn assign_all(&mut self) {
        info!(tracked = self.order.len(), "starting assignment pass");

        for idx in self.order.clone() {
            if self.graph.task(idx).status != TaskStatus::NotStarted || !self.can_assign(idx) {
                continue;
            }
            if let Err(err) = self.assign(idx).await {
                error!(task = %self.graph.task(idx).id, error = %err, "assignment failed");
            }
        }
    }

    /// Submit one eligible task to its owner. A synchronous completion
    /// cascades over every pending task before this returns.
    pub async fn assign(&mut self, idx: usize) -> Result<AssignOutcome> {
        let outcome = self.submit(idx).await?;
        if outcome == AssignOutcome::Completed {
            self.cascade().await;
        }
        Ok(outcome)
    }

    /// Re-scan every `NotStarted` tracked task and assign the eligible ones,
    /// repeating while synchronous completions keep unlocking more work.
    pub async fn cascade(&mut self) {
        loop {
            let candidates = StateManager::new(&mut self.graph).collect_assignable(&self.order);
            if candidates.is_empty() {
                return;
            }
            debug!(candidates = candidates.len(), "cascading over eligible tasks");

            let mut progressed = false;
            for idx in candidates {
                // An earlier submission in this sweep may have changed things.
                if self.graph.task(idx).status != TaskStatus::NotStarted || !self.can_assign(idx) {
                    continue;
                }
                match self.submit(idx).await {
                    Ok(AssignOutcome::Completed) | Ok(AssignOutcome::Failed) => progressed = true,
                    Ok(_) => {}
                    Err(err) => {
                        error!(task = %self.graph.task(idx).id, error = %err, "assignment failed");
                    }
                }
            }

            if !progressed {
                return;
            }
        }
    }

    /// Record a completion observed by the poller. Returns whether the
    /// status changed.
    pub fn record_completion(&mut self, idx: usize, result: String) -> bool {
        self.release_owner(idx);
        StateManager::new(&mut self.graph).mark_completed(idx, result)
    }

    /// Record a worker-reported failure. Returns whether the status changed.
    pub fn record_failure(&mut self, idx: usize, error: String) -> bool {
        self.release_owner(idx);
        StateManager::new(&mut self.graph).mark_failed(idx, error)
    }

    fn release_owner(&mut self, idx: usize) {
        let task = self.graph.task(idx);
        self.registry.clear(&task.owner, &task.id);
    }

    /// One submission without cascading.
    async fn submit(&mut self, idx: usize) -> Result<AssignOutcome> {
        let task = self.graph.task(idx);
        let task_id = task.id.clone();
        let owner = task.owner.clone();

        if !self.can_assign(idx) {
            return Err(CollabError::Dependency(format!(
                "task '{}' has dependencies that are not completed",
                task.title
            )));
        }

        let endpoint = match self.registry.get(&owner) {
            Some(record) if record.is_busy() => {
                debug!(task = %task_id, agent = %owner, "owner busy; deferring task");
                return Ok(AssignOutcome::OwnerBusy);
            }
            Some(record) => record.endpoint.clone(),
            None => {
                warn!(task = %task_id, agent = %owner, "task owner is not a registered worker");
                return Err(CollabError::AgentNotFound(owner));
            }
        };

        let payload = task.payload();
        StateManager::new(&mut self.graph).mark_assigned(idx);
        self.registry.mark_busy(&owner, &task_id);
        info!(task = %task_id, agent = %owner, title = %payload.title, "submitting task");

        let outcome = match self.client.submit(&endpoint, &payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // The worker may never have seen the task; free it for other
                // work but leave the task `Assigned`.
                self.registry.clear(&owner, &task_id);
                if matches!(err, CollabError::Unreachable { .. }) {
                    self.registry.set_liveness(&owner, Liveness::Unreachable);
                }
                return Err(err);
            }
        };
        self.registry.set_liveness(&owner, Liveness::Ready);

        let outcome = match outcome {
            SubmitOutcome::Completed(result) => {
                info!(task = %task_id, agent = %owner, "task completed synchronously");
                self.registry.set_reported_status(&owner, WorkerStatus::Idle);
                self.record_completion(idx, result);
                AssignOutcome::Completed
            }
            SubmitOutcome::Accepted => {
                StateManager::new(&mut self.graph).mark_in_progress(idx);
                self.registry.set_reported_status(&owner, WorkerStatus::Working);
                AssignOutcome::InProgress
            }
            SubmitOutcome::Rejected(error) => {
                warn!(task = %task_id, agent = %owner, %error, "worker reported task failure");
                self.registry.set_reported_status(&owner, WorkerStatus::Error);
                self.record_failure(idx, error);
                AssignOutcome::Failed
            }
        };

        Ok(outcome)
    }
}

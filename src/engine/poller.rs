// src/engine/poller.rs

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::client::WorkerClient;
use crate::protocol::ResultStatus;

use super::dispatcher::Dispatcher;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Result of waiting for a session to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    /// The session timeout elapsed first. Outstanding work is not cancelled.
    TimedOut,
    /// Nothing is in flight and some tracked task is not completed, so no
    /// poll can ever change a status again.
    Stalled,
}

/// Detects completions of tasks that workers acknowledged without finishing
/// them inside the submission request.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl Poller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// One sweep over every `InProgress` task. Completions unlock dependents
    /// through a cascade before this returns.
    ///
    /// Returns the number of tasks that reached a terminal status.
    pub async fn poll_once<C: WorkerClient>(&self, dispatcher: &mut Dispatcher<C>) -> usize {
        let mut finished = 0;

        for idx in dispatcher.in_progress() {
            let task = dispatcher.graph().task(idx);
            let task_id = task.id.clone();
            let owner = task.owner.clone();

            let Some(endpoint) = dispatcher.registry().get(&owner).map(|r| r.endpoint.clone())
            else {
                warn!(task = %task_id, agent = %owner, "in-progress task has no registered owner");
                continue;
            };

            let status = match dispatcher.client().status(&endpoint).await {
                Ok(status) => status,
                Err(err) => {
                    warn!(task = %task_id, agent = %owner, error = %err, "status poll failed");
                    continue;
                }
            };
            dispatcher
                .registry_mut()
                .set_reported_status(&owner, status.status);

            if !status.is_idle() {
                debug!(task = %task_id, agent = %owner, "worker still busy");
                continue;
            }

            let results = match dispatcher.client().results(&endpoint).await {
                Ok(results) => results,
                Err(err) => {
                    warn!(task = %task_id, agent = %owner, error = %err, "results poll failed");
                    continue;
                }
            };

            let Some(entry) = results.entry_for(&task_id) else {
                debug!(task = %task_id, agent = %owner, "completion not reflected yet");
                continue;
            };

            let changed = match entry.status {
                ResultStatus::Completed => {
                    info!(task = %task_id, agent = %owner, "task completed");
                    dispatcher.record_completion(idx, entry.result.clone())
                }
                ResultStatus::Failed => {
                    warn!(task = %task_id, agent = %owner, "task failed on worker");
                    dispatcher.record_failure(idx, entry.result.clone())
                }
            };
            if changed {
                finished += 1;
            }
        }

        if finished > 0 {
            dispatcher.cascade().await;
        }
        finished
    }

    /// Poll until every tracked task is `Completed`, the timeout elapses, or
    /// nothing is left in flight.
    pub async fn wait_for_completion<C: WorkerClient>(
        &self,
        dispatcher: &mut Dispatcher<C>,
    ) -> WaitOutcome {
        let deadline = Instant::now() + self.timeout;

        loop {
            if dispatcher.all_completed() {
                info!("all tracked tasks completed");
                return WaitOutcome::Completed;
            }
            if dispatcher.in_progress().is_empty() {
                let summary = dispatcher.summary();
                warn!(
                    failed = summary.failed,
                    assigned = summary.assigned,
                    not_started = summary.not_started,
                    "no task in flight; session cannot progress"
                );
                return WaitOutcome::Stalled;
            }
            if Instant::now() >= deadline {
                warn!(timeout = ?self.timeout, "session timed out waiting for tasks");
                return WaitOutcome::TimedOut;
            }

            sleep(self.interval).await;
            self.poll_once(dispatcher).await;
        }
    }
}

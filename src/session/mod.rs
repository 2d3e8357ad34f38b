// src/session/mod.rs

//! One orchestration session: start the workers, dispatch the task graph,
//! wait for completion and always stop the workers again.

pub mod supervisor;

use std::time::Duration;

use tracing::{error, info, warn};

use crate::client::WorkerClient;
use crate::dag::{StatusSummary, TaskGraph};
use crate::engine::{AgentRegistry, Dispatcher, Poller, WaitOutcome, WorkerRecord};
use crate::errors::Result;
use crate::types::Liveness;

pub use supervisor::{
    AgentSupervisor, ProcessHandle, ProcessSupervisor, READINESS_CHECK_INTERVAL,
    SupervisorFuture, TERMINATE_GRACE, WorkerSpec,
};

pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(30);

/// What a finished session reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: WaitOutcome,
    pub summary: StatusSummary,
}

pub struct Session<S: AgentSupervisor, C: WorkerClient> {
    supervisor: S,
    client: C,
    workers: Vec<WorkerSpec>,
    poller: Poller,
    readiness_timeout: Duration,
}

impl<S: AgentSupervisor, C: WorkerClient> Session<S, C> {
    pub fn new(supervisor: S, client: C, workers: Vec<WorkerSpec>) -> Self {
        Self {
            supervisor,
            client,
            workers,
            poller: Poller::default(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
        }
    }

    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_readiness_timeout(mut self, readiness_timeout: Duration) -> Self {
        self.readiness_timeout = readiness_timeout;
        self
    }

    /// Run `graph` to completion (or timeout).
    ///
    /// A worker that fails to start aborts the session after every worker
    /// spawned so far has been terminated.
    pub async fn run(self, graph: TaskGraph) -> Result<SessionReport> {
        let Session {
            mut supervisor,
            client,
            workers,
            poller,
            readiness_timeout,
        } = self;

        let mut handles = Vec::with_capacity(workers.len());
        let mut registry = AgentRegistry::new();

        if let Err(err) = start_workers(
            &mut supervisor,
            &workers,
            readiness_timeout,
            &mut handles,
            &mut registry,
        )
        .await
        {
            error!(error = %err, "worker startup failed; cleaning up");
            cleanup(&mut supervisor, handles).await;
            return Err(err);
        }

        let mut dispatcher = Dispatcher::new(graph, registry, client);
        dispatcher.assign_all().await;
        let outcome = poller.wait_for_completion(&mut dispatcher).await;
        let summary = dispatcher.summary();

        cleanup(&mut supervisor, handles).await;

        info!(
            ?outcome,
            completed = summary.completed,
            failed = summary.failed,
            total = summary.total_tasks,
            "session finished"
        );
        Ok(SessionReport { outcome, summary })
    }
}

async fn start_workers<S: AgentSupervisor>(
    supervisor: &mut S,
    workers: &[WorkerSpec],
    readiness_timeout: Duration,
    handles: &mut Vec<S::Handle>,
    registry: &mut AgentRegistry,
) -> Result<()> {
    for spec in workers {
        let mut handle = supervisor.spawn(spec).await?;
        registry.register(WorkerRecord::new(
            spec.name.clone(),
            spec.role,
            spec.endpoint(),
        ));

        let ready = supervisor.await_ready(&mut handle, readiness_timeout).await;
        handles.push(handle);
        ready?;
        registry.set_liveness(&spec.name, Liveness::Ready);
    }
    Ok(())
}

async fn cleanup<S: AgentSupervisor>(supervisor: &mut S, handles: Vec<S::Handle>) {
    info!(workers = handles.len(), "stopping workers");
    for handle in handles {
        if let Err(err) = supervisor.terminate(handle).await {
            warn!(error = %err, "failed to stop worker cleanly");
        }
    }
}

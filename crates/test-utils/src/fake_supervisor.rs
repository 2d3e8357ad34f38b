use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_collab::errors::CollabError;
use agent_collab::session::{AgentSupervisor, SupervisorFuture, WorkerSpec};

/// Lifecycle call observed by a [`FakeSupervisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    Spawned(String),
    Ready(String),
    Terminated(String),
}

/// Supervisor that spawns nothing and records what it was asked to do.
///
/// Workers listed in `never_ready` time out in `await_ready`.
#[derive(Debug, Clone, Default)]
pub struct FakeSupervisor {
    events: Arc<Mutex<Vec<SupervisorEvent>>>,
    never_ready: HashSet<String>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn never_ready(mut self, name: &str) -> Self {
        self.never_ready.insert(name.to_string());
        self
    }

    pub fn events(&self) -> Vec<SupervisorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SupervisorEvent::Terminated(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SupervisorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AgentSupervisor for FakeSupervisor {
    type Handle = String;

    fn spawn<'a>(&'a mut self, spec: &'a WorkerSpec) -> SupervisorFuture<'a, String> {
        Box::pin(async move {
            self.record(SupervisorEvent::Spawned(spec.name.clone()));
            Ok(spec.name.clone())
        })
    }

    fn await_ready<'a>(
        &'a self,
        handle: &'a mut String,
        within: Duration,
    ) -> SupervisorFuture<'a, ()> {
        Box::pin(async move {
            if self.never_ready.contains(handle.as_str()) {
                tokio::time::sleep(within).await;
                return Err(CollabError::Timeout {
                    what: format!("agent '{handle}' readiness"),
                    after: within,
                });
            }
            self.record(SupervisorEvent::Ready(handle.clone()));
            Ok(())
        })
    }

    fn terminate<'a>(&'a mut self, handle: String) -> SupervisorFuture<'a, ()> {
        Box::pin(async move {
            self.record(SupervisorEvent::Terminated(handle));
            Ok(())
        })
    }
}

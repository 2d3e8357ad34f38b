use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agent_collab::client::{ClientFuture, SubmitOutcome, WorkerClient};
use agent_collab::errors::CollabError;
use agent_collab::protocol::{
    HealthResponse, ResultLogEntry, ResultStatus, ResultsResponse, StatusResponse, TaskPayload,
};
use agent_collab::types::WorkerStatus;

/// How a fake worker answers `POST /task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behaviour {
    /// Finish inside the request with this result text.
    CompleteSync(String),
    /// Acknowledge and keep the task in flight until [`FakeWorkerClient::finish`].
    AcceptAsync,
    /// Report an execution failure with this error text.
    Reject(String),
    /// Fail the request at the transport level.
    Unreachable,
}

#[derive(Debug, Default)]
struct FakeWorker {
    behaviour: Option<Behaviour>,
    current: Option<TaskPayload>,
    status: WorkerStatus,
    results: Vec<ResultLogEntry>,
    polls_fail: bool,
}

#[derive(Debug, Default)]
struct Inner {
    workers: HashMap<String, FakeWorker>,
    submissions: Vec<(String, TaskPayload)>,
    status_calls: usize,
    results_calls: usize,
}

/// In-memory `WorkerClient`.
///
/// Workers are keyed by endpoint and created on first use. Unconfigured
/// workers complete every task synchronously with `"ok"`. Clones share
/// state, so a test keeps one handle while the dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeWorkerClient {
    inner: Arc<Mutex<Inner>>,
}

impl FakeWorkerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script how the worker at `endpoint` answers submissions.
    pub fn set_behaviour(&self, endpoint: &str, behaviour: Behaviour) {
        let mut inner = self.inner.lock().unwrap();
        inner.workers.entry(endpoint.to_string()).or_default().behaviour = Some(behaviour);
    }

    /// Make `/status` and `/results` of `endpoint` fail (or work again).
    pub fn set_polls_fail(&self, endpoint: &str, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.workers.entry(endpoint.to_string()).or_default().polls_fail = fail;
    }

    /// Complete the in-flight task of an async worker: the entry appears in
    /// its result log and the worker goes idle.
    pub fn finish(&self, endpoint: &str, status: ResultStatus, result: &str) {
        let mut inner = self.inner.lock().unwrap();
        let worker = inner.workers.entry(endpoint.to_string()).or_default();
        let task = worker
            .current
            .take()
            .unwrap_or_else(|| panic!("no task in flight on {endpoint}"));
        worker.results.push(ResultLogEntry {
            task,
            result: result.to_string(),
            status,
        });
        worker.status = match status {
            ResultStatus::Completed => WorkerStatus::Idle,
            ResultStatus::Failed => WorkerStatus::Error,
        };
    }

    /// Id of the task currently in flight on `endpoint`.
    pub fn in_flight(&self, endpoint: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .workers
            .get(endpoint)
            .and_then(|w| w.current.as_ref())
            .map(|t| t.id.clone())
    }

    /// Titles of every submission, in order.
    pub fn submitted_titles(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.submissions.iter().map(|(_, t)| t.title.clone()).collect()
    }

    /// Full submission log as `(endpoint, payload)` pairs.
    pub fn submissions(&self) -> Vec<(String, TaskPayload)> {
        self.inner.lock().unwrap().submissions.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.inner.lock().unwrap().status_calls
    }

    pub fn results_calls(&self) -> usize {
        self.inner.lock().unwrap().results_calls
    }

    fn do_submit(&self, endpoint: &str, payload: &TaskPayload) -> Result<SubmitOutcome, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .submissions
            .push((endpoint.to_string(), payload.clone()));

        let worker = inner.workers.entry(endpoint.to_string()).or_default();
        let behaviour = worker
            .behaviour
            .clone()
            .unwrap_or_else(|| Behaviour::CompleteSync("ok".to_string()));

        match behaviour {
            Behaviour::CompleteSync(result) => {
                worker.results.push(ResultLogEntry {
                    task: payload.clone(),
                    result: result.clone(),
                    status: ResultStatus::Completed,
                });
                worker.status = WorkerStatus::Idle;
                Ok(SubmitOutcome::Completed(result))
            }
            Behaviour::AcceptAsync => {
                assert!(
                    worker.current.is_none(),
                    "second submission to busy worker {endpoint}"
                );
                worker.current = Some(payload.clone());
                worker.status = WorkerStatus::Working;
                Ok(SubmitOutcome::Accepted)
            }
            Behaviour::Reject(error) => {
                worker.status = WorkerStatus::Error;
                Ok(SubmitOutcome::Rejected(error))
            }
            Behaviour::Unreachable => Err(CollabError::unreachable(endpoint, "connection refused")),
        }
    }

    fn do_status(&self, endpoint: &str) -> Result<StatusResponse, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.status_calls += 1;
        let worker = inner.workers.entry(endpoint.to_string()).or_default();
        if worker.polls_fail {
            return Err(CollabError::communication(endpoint, "status poll refused"));
        }
        Ok(StatusResponse {
            name: endpoint.to_string(),
            role: "generic".to_string(),
            status: worker.status,
            current_task: worker.current.clone(),
            completed_tasks: worker.results.len(),
        })
    }

    fn do_results(&self, endpoint: &str) -> Result<ResultsResponse, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.results_calls += 1;
        let worker = inner.workers.entry(endpoint.to_string()).or_default();
        if worker.polls_fail {
            return Err(CollabError::communication(endpoint, "results poll refused"));
        }
        Ok(ResultsResponse {
            agent: endpoint.to_string(),
            results: worker.results.clone(),
        })
    }
}

impl WorkerClient for FakeWorkerClient {
    fn health<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, HealthResponse> {
        Box::pin(async move {
            Ok(HealthResponse {
                status: "healthy".to_string(),
                agent: endpoint.to_string(),
            })
        })
    }

    fn status<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, StatusResponse> {
        Box::pin(async move { self.do_status(endpoint) })
    }

    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a TaskPayload,
    ) -> ClientFuture<'a, SubmitOutcome> {
        Box::pin(async move { self.do_submit(endpoint, payload) })
    }

    fn results<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, ResultsResponse> {
        Box::pin(async move { self.do_results(endpoint) })
    }
}

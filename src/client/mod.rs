// src/client/mod.rs

//! Orchestrator-side access to worker processes.
//!
//! The dispatcher and poller talk to a `WorkerClient` instead of issuing HTTP
//! requests directly. Production code uses [`HttpWorkerClient`]; tests can
//! plug in an in-memory fake that scripts worker behaviour.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::protocol::{HealthResponse, ResultsResponse, StatusResponse, TaskPayload};

pub use http::HttpWorkerClient;

/// Boxed future returned by [`WorkerClient`] methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// How a worker answered a task submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The worker executed the task inside the request and returned its
    /// outcome text.
    Completed(String),
    /// The worker acknowledged the task; completion must be polled for.
    Accepted,
    /// The worker reported that executing the task failed.
    Rejected(String),
}

/// Trait abstracting the worker HTTP surface.
///
/// `endpoint` is the worker's base URL, e.g. `http://localhost:8001`.
pub trait WorkerClient: Send + Sync {
    /// `GET /health`.
    fn health<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, HealthResponse>;

    /// `GET /status`.
    fn status<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, StatusResponse>;

    /// `POST /task`.
    ///
    /// Transport failures and unexpected responses are errors; a worker's own
    /// execution failure is `Ok(SubmitOutcome::Rejected(..))`.
    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a TaskPayload,
    ) -> ClientFuture<'a, SubmitOutcome>;

    /// `GET /results`.
    fn results<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, ResultsResponse>;
}

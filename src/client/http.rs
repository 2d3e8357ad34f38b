// src/client/http.rs

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ClientFuture, SubmitOutcome, WorkerClient};
use crate::errors::{CollabError, Result};
use crate::protocol::{HealthResponse, ResultsResponse, StatusResponse, TaskPayload};
use crate::retry::RetryPolicy;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lenient view of a `POST /task` reply body.
#[derive(Debug, Default, Deserialize)]
struct SubmitAck {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `reqwest`-backed worker client.
///
/// Reads (`/health`, `/status`, `/results`) are retried with the configured
/// backoff. Submissions are only retried when the request never reached the
/// worker, so a task is not executed twice because of a retry.
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpWorkerClient {
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CollabError::Other(e.into()))?;
        Ok(Self { client, retry })
    }

    /// Client for one-shot checks (readiness checks) without retries.
    pub fn without_retry(&self) -> Self {
        Self {
            client: self.client.clone(),
            retry: RetryPolicy::once(),
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, endpoint: &str, path: &str) -> Result<T> {
        let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_send_error(endpoint, e))?;

        if !response.status().is_success() {
            return Err(CollabError::communication(
                endpoint,
                format!("GET {path} returned {}", response.status()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CollabError::communication(endpoint, format!("decoding GET {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, path: &str) -> Result<T> {
        self.retry
            .run(path, || self.get_once::<T>(endpoint, path))
            .await
    }

    async fn submit_once(&self, endpoint: &str, payload: &TaskPayload) -> Result<SubmitOutcome> {
        let url = format!("{}/task", endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| map_send_error(endpoint, e))?;

        let http_status = response.status();
        let ack = response.json::<SubmitAck>().await.ok();
        debug!(task = %payload.id, %http_status, "worker answered task submission");

        interpret_ack(endpoint, http_status, ack)
    }
}

fn map_send_error(endpoint: &str, err: reqwest::Error) -> CollabError {
    if err.is_connect() {
        CollabError::unreachable(endpoint, err)
    } else {
        CollabError::communication(endpoint, err)
    }
}

fn interpret_ack(
    endpoint: &str,
    http_status: reqwest::StatusCode,
    ack: Option<SubmitAck>,
) -> Result<SubmitOutcome> {
    let ack = ack.unwrap_or_default();

    if http_status.is_success() {
        return Ok(match ack.status.as_deref() {
            Some("completed") => SubmitOutcome::Completed(ack.result.unwrap_or_default()),
            _ => SubmitOutcome::Accepted,
        });
    }

    match ack.status.as_deref() {
        Some("failed") => Ok(SubmitOutcome::Rejected(
            ack.error
                .unwrap_or_else(|| format!("worker returned {http_status}")),
        )),
        _ => Err(CollabError::communication(
            endpoint,
            format!("POST /task returned {http_status}"),
        )),
    }
}

impl WorkerClient for HttpWorkerClient {
    fn health<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, HealthResponse> {
        Box::pin(self.get_json(endpoint, "/health"))
    }

    fn status<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, StatusResponse> {
        Box::pin(self.get_json(endpoint, "/status"))
    }

    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a TaskPayload,
    ) -> ClientFuture<'a, SubmitOutcome> {
        Box::pin(async move {
            self.retry
                .run_if(
                    "POST /task",
                    |err| matches!(err, CollabError::Unreachable { .. }),
                    || self.submit_once(endpoint, payload),
                )
                .await
        })
    }

    fn results<'a>(&'a self, endpoint: &'a str) -> ClientFuture<'a, ResultsResponse> {
        Box::pin(self.get_json(endpoint, "/results"))
    }
}

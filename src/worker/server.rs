// src/worker/server.rs

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::Result;
use crate::protocol::{HealthResponse, ResultsResponse, StatusResponse, TaskPayload, TaskReply};
use crate::worker::executor::TaskExecutor;

/// Router exposing the worker HTTP surface.
pub fn create_router(executor: TaskExecutor) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/task", post(submit_task))
        .route("/results", get(results))
        .with_state(executor)
}

async fn health(State(executor): State<TaskExecutor>) -> Json<HealthResponse> {
    Json(executor.health())
}

async fn status(State(executor): State<TaskExecutor>) -> Json<StatusResponse> {
    Json(executor.status().await)
}

async fn results(State(executor): State<TaskExecutor>) -> Json<ResultsResponse> {
    Json(executor.results().await)
}

/// Runs the task inside the request: 200 with the result, 500 on failure.
async fn submit_task(
    State(executor): State<TaskExecutor>,
    Json(task): Json<TaskPayload>,
) -> Response {
    match executor.execute(task).await {
        Ok(result) => (StatusCode::OK, Json(TaskReply::Completed { result })).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TaskReply::Failed {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Serve the worker on `localhost:<port>` until Ctrl-C.
pub async fn serve(executor: TaskExecutor, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(agent = %executor.name(), %addr, "worker listening");

    axum::serve(listener, create_router(executor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("worker shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

// src/worker/mod.rs

//! Worker process: one agent with a fixed role, served over HTTP.
//!
//! - [`executor`] holds the per-worker state machine and result log.
//! - [`roles`] builds role-specific prompts and writes result files.
//! - [`runner`] invokes the external code-generation tool.
//! - [`server`] exposes `/health`, `/status`, `/task` and `/results`.

pub mod executor;
pub mod roles;
pub mod runner;
pub mod server;

pub use executor::TaskExecutor;
pub use runner::{CodeRunner, RunnerFuture, ToolRunner};
pub use server::{create_router, serve};

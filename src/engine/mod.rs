// src/engine/mod.rs

//! Orchestration engine for agent-collab.
//!
//! This module ties together:
//! - the [`registry`] of workers known to the session
//! - the [`dispatcher`], which submits eligible tasks and cascades over
//!   synchronous completions
//! - the [`poller`], which detects completions reported through the
//!   workers' result logs
//!
//! Everything here runs on one control flow; suspension only happens at
//! worker network calls.

pub mod dispatcher;
pub mod poller;
pub mod registry;

pub use dispatcher::{AssignOutcome, Dispatcher};
pub use poller::{DEFAULT_POLL_INTERVAL, DEFAULT_SESSION_TIMEOUT, Poller, WaitOutcome};
pub use registry::{AgentRegistry, WorkerRecord};

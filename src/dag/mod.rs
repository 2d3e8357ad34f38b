// src/dag/mod.rs

//! Task graph and dependency scheduling.
//!
//! - [`task`] defines task records and their lifecycle status.
//! - [`graph`] holds the task set with title-resolved dependency edges.
//! - [`scheduler`] computes the priority-tie-broken execution order.
//! - [`state_manager`] applies status transitions and answers eligibility
//!   questions for the dispatcher.

pub mod graph;
pub mod scheduler;
pub mod state_manager;
pub mod task;

pub use graph::TaskGraph;
pub use scheduler::{order, unschedulable};
pub use state_manager::{ReadOnlyStateManager, StateManager, StatusSummary, TaskSummary};
pub use task::{
    DEFAULT_AGENT, DEFAULT_PRIORITY, DEFAULT_TASK_KIND, Task, TaskId, TaskSpec, TaskStatus,
};

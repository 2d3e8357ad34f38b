//! Shared helpers for agent-collab integration tests.
//!
//! - [`builders`]: task specs, configs and registries with terse defaults.
//! - [`fake_worker`]: in-memory `WorkerClient` with scripted per-worker
//!   behaviour.
//! - [`fake_supervisor`]: `AgentSupervisor` that records lifecycle calls.
//! - [`fake_runner`]: `CodeRunner` that answers without spawning processes.

pub mod builders;
pub mod fake_runner;
pub mod fake_supervisor;
pub mod fake_worker;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use builders::{ConfigFileBuilder, TaskSpecBuilder, endpoint_for, graph, registry_for};
pub use fake_runner::ScriptedRunner;
pub use fake_supervisor::{FakeSupervisor, SupervisorEvent};
pub use fake_worker::{Behaviour, FakeWorkerClient};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output only shows for failing tests unless run with `--nocapture`;
/// filter with e.g. `RUST_LOG=agent_collab=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("agent_collab=info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Fail the test if `f` takes longer than `limit` (in tokio time, so paused
/// clocks auto-advance).
pub async fn within<F, T>(limit: Duration, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(limit, f)
        .await
        .unwrap_or_else(|_| panic!("test future did not finish within {limit:?}"))
}

// src/session/supervisor.rs

//! Worker process lifecycle: spawn, wait for readiness, terminate.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::client::{HttpWorkerClient, WorkerClient};
use crate::errors::{CollabError, Result};
use crate::types::{AgentName, AgentRole};

/// Delay between two `/health` checks while waiting for a worker.
pub const READINESS_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on waiting for a killed worker to exit.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);

pub type SupervisorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Everything needed to start one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub name: AgentName,
    pub role: AgentRole,
    pub port: u16,
    pub workspace: PathBuf,
}

impl WorkerSpec {
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Starts and stops worker processes for a session.
///
/// The session only depends on this trait; tests substitute a supervisor
/// that never spawns anything.
pub trait AgentSupervisor: Send {
    type Handle: Send;

    fn spawn<'a>(&'a mut self, spec: &'a WorkerSpec) -> SupervisorFuture<'a, Self::Handle>;

    /// Resolve once the worker answers `/health`, or fail after `within`.
    fn await_ready<'a>(
        &'a self,
        handle: &'a mut Self::Handle,
        within: Duration,
    ) -> SupervisorFuture<'a, ()>;

    fn terminate<'a>(&'a mut self, handle: Self::Handle) -> SupervisorFuture<'a, ()>;
}

/// A worker running as a child process of this binary.
#[derive(Debug)]
pub struct ProcessHandle {
    name: AgentName,
    endpoint: String,
    child: Child,
}

impl ProcessHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Re-executes the current binary as `worker` subcommands.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    program: PathBuf,
    code_tool: String,
    log_level: Option<String>,
    health_check: HttpWorkerClient,
}

impl ProcessSupervisor {
    pub fn new(
        program: PathBuf,
        code_tool: impl Into<String>,
        log_level: Option<String>,
        client: &HttpWorkerClient,
    ) -> Self {
        Self {
            program,
            code_tool: code_tool.into(),
            log_level,
            health_check: client.without_retry(),
        }
    }

    /// Supervisor that spawns workers from the running executable.
    pub fn from_current_exe(
        code_tool: impl Into<String>,
        log_level: Option<String>,
        client: &HttpWorkerClient,
    ) -> Result<Self> {
        let program = std::env::current_exe()?;
        Ok(Self::new(program, code_tool, log_level, client))
    }

    fn command(&self, spec: &WorkerSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(level) = &self.log_level {
            cmd.arg("--log-level").arg(level);
        }
        cmd.arg("worker")
            .arg("--name")
            .arg(&spec.name)
            .arg("--role")
            .arg(spec.role.as_tag())
            .arg("--port")
            .arg(spec.port.to_string())
            .arg("--workspace")
            .arg(&spec.workspace)
            .arg("--tool")
            .arg(&self.code_tool)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }

    async fn wait_ready(&self, handle: &mut ProcessHandle, within: Duration) -> Result<()> {
        let deadline = Instant::now() + within;

        loop {
            if let Some(status) = handle.child.try_wait()? {
                return Err(CollabError::AgentStartup {
                    agent: handle.name.clone(),
                    reason: format!("worker process exited early with {status}"),
                });
            }

            match self.health_check.health(&handle.endpoint).await {
                Ok(_) => {
                    info!(agent = %handle.name, endpoint = %handle.endpoint, "worker ready");
                    return Ok(());
                }
                Err(err) => debug!(agent = %handle.name, error = %err, "worker not ready yet"),
            }

            if Instant::now() >= deadline {
                return Err(CollabError::Timeout {
                    what: format!("agent '{}' readiness", handle.name),
                    after: within,
                });
            }
            sleep(READINESS_CHECK_INTERVAL).await;
        }
    }

    async fn stop(&self, mut handle: ProcessHandle) -> Result<()> {
        if let Err(e) = handle.child.start_kill() {
            debug!(agent = %handle.name, error = %e, "worker already gone");
        }

        match timeout(TERMINATE_GRACE, handle.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(agent = %handle.name, %status, "worker exited");
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!(agent = %handle.name, "worker did not exit in time");
                Err(CollabError::Timeout {
                    what: format!("agent '{}' termination", handle.name),
                    after: TERMINATE_GRACE,
                })
            }
        }
    }
}

impl AgentSupervisor for ProcessSupervisor {
    type Handle = ProcessHandle;

    fn spawn<'a>(&'a mut self, spec: &'a WorkerSpec) -> SupervisorFuture<'a, ProcessHandle> {
        Box::pin(async move {
            info!(agent = %spec.name, role = %spec.role, port = spec.port, "spawning worker");
            let child = self.command(spec).spawn().map_err(|e| CollabError::AgentStartup {
                agent: spec.name.clone(),
                reason: e.to_string(),
            })?;

            Ok(ProcessHandle {
                name: spec.name.clone(),
                endpoint: spec.endpoint(),
                child,
            })
        })
    }

    fn await_ready<'a>(
        &'a self,
        handle: &'a mut ProcessHandle,
        within: Duration,
    ) -> SupervisorFuture<'a, ()> {
        Box::pin(self.wait_ready(handle, within))
    }

    fn terminate<'a>(&'a mut self, handle: ProcessHandle) -> SupervisorFuture<'a, ()> {
        Box::pin(self.stop(handle))
    }
}

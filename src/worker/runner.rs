// src/worker/runner.rs

//! External code-generation tool invocation.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::errors::Result;

/// Name of the prompt file written next to the agent's work.
const PROMPT_FILE: &str = ".agent-collab-prompt.txt";

pub type RunnerFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Runs a prompt through some code-generation capability and returns its
/// textual output.
///
/// Production workers use [`ToolRunner`]; tests can plug in a scripted
/// runner that never spawns processes.
pub trait CodeRunner: Send + Sync {
    fn run<'a>(&'a self, prompt: &'a str, workdir: &'a Path) -> RunnerFuture<'a>;
}

/// Spawns `<program> --prompt <file> --workspace <dir>` inside the agent
/// workspace and captures stdout.
///
/// A tool that cannot be spawned or exits non-zero still yields `Ok`: the
/// failure text becomes the task output, so dependents are not blocked by a
/// broken tool. Only local I/O around the call is an error.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
}

impl ToolRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_inner(&self, prompt: &str, workdir: &Path) -> Result<String> {
        let prompt_path = workdir.join(PROMPT_FILE);
        tokio::fs::write(&prompt_path, prompt).await?;

        info!(program = %self.program, workdir = %workdir.display(), "running code tool");

        let output = Command::new(&self.program)
            .arg("--prompt")
            .arg(&prompt_path)
            .arg("--workspace")
            .arg(workdir)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&prompt_path).await {
            debug!(path = %prompt_path.display(), error = %e, "failed to remove prompt file");
        }

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                error!(program = %self.program, error = %e, "failed to spawn code tool");
                return Ok(format!("Failed to execute task: {e}"));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                program = %self.program,
                exit_code = output.status.code().unwrap_or(-1),
                "code tool failed"
            );
            return Ok(format!("Task execution failed: {}", stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CodeRunner for ToolRunner {
    fn run<'a>(&'a self, prompt: &'a str, workdir: &'a Path) -> RunnerFuture<'a> {
        Box::pin(self.run_inner(prompt, workdir))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::CollabError;

    #[tokio::test]
    async fn missing_program_becomes_task_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ToolRunner::new("agent-collab-no-such-tool");
        let output = runner.run("prompt", dir.path()).await.unwrap();
        assert!(output.starts_with("Failed to execute task: "));
        assert!(!dir.path().join(PROMPT_FILE).exists());
    }

    #[tokio::test]
    async fn nonzero_exit_reports_stderr_as_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ToolRunner::new("false");
        let output = runner.run("prompt", dir.path()).await.unwrap();
        assert_eq!(output, "Task execution failed: ");
    }

    #[tokio::test]
    async fn missing_workdir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ToolRunner::new("true");
        let err = runner
            .run("prompt", &dir.path().join("gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollabError::IoError(_)));
    }
}

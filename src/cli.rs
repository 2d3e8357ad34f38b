// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `agent-collab`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agent-collab",
    version,
    about = "Coordinate role-specialised worker agents through a task dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AGENT_COLLAB_LOG`, then `[system].log_level`, then `info`
    /// is used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the workers, run every task and print a status summary.
    Run(RunArgs),

    /// Print the execution order without starting any worker.
    Plan(PlanArgs),

    /// Load and validate the config file.
    Validate(ValidateArgs),

    /// Serve a single worker (normally spawned by `run`).
    Worker(WorkerArgs),

    /// Create a workspace with a default config file and agent directories.
    Init(InitArgs),

    /// Show the docs, agent directories and config found in a workspace.
    Status(StatusArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Markdown task list. Without it, tasks come from `[task_types]`.
    #[arg(long, value_name = "FILE")]
    pub tasks: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `AgentCollab.toml` in the current directory if present,
    /// otherwise the built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Overrides `[system].workspace`.
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[arg(long, value_name = "FILE")]
    pub tasks: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct WorkerArgs {
    #[arg(long)]
    pub name: String,

    /// Role tag, e.g. `code_implementation`. Defaults to the agent name.
    #[arg(long)]
    pub role: Option<String>,

    #[arg(long)]
    pub port: u16,

    #[arg(long, value_name = "DIR")]
    pub workspace: PathBuf,

    /// Code-generation program invoked for each task.
    #[arg(long, value_name = "PROGRAM", default_value = "claude-code")]
    pub tool: String,
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    #[arg(long, value_name = "DIR", default_value = "./workspace")]
    pub workspace: PathBuf,

    /// Where to write the config. Default: `<workspace>/AgentCollab.toml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    #[arg(long, value_name = "DIR", default_value = "./workspace")]
    pub workspace: PathBuf,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod plan;
pub mod protocol;
pub mod retry;
pub mod session;
pub mod types;
pub mod worker;
pub mod workspace;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::{
    CliArgs, Command, InitArgs, PlanArgs, RunArgs, StatusArgs, ValidateArgs, WorkerArgs,
};
use crate::client::HttpWorkerClient;
use crate::config::{ConfigFile, load_or_default};
use crate::dag::{StatusSummary, TaskGraph, TaskSpec, order, unschedulable};
use crate::engine::WaitOutcome;
use crate::session::{ProcessSupervisor, Session};
use crate::types::AgentRole;
use crate::worker::{TaskExecutor, ToolRunner};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command.clone() {
        Command::Run(run_args) => run_session(&args, run_args).await,
        Command::Plan(plan_args) => print_plan(plan_args),
        Command::Validate(validate_args) => validate(validate_args),
        Command::Worker(worker_args) => run_worker(worker_args).await,
        Command::Init(init_args) => init(init_args),
        Command::Status(status_args) => status(status_args),
    }
}

/// `[system].log_level` of the config the command would use, if any.
///
/// Read before logging is initialised, so failures are ignored here and
/// reported later by the command itself.
pub fn config_log_level(args: &CliArgs) -> Option<String> {
    let explicit = match &args.command {
        Command::Run(a) => a.config.as_deref(),
        Command::Plan(a) => a.config.as_deref(),
        Command::Validate(a) => a.config.as_deref(),
        Command::Worker(_) | Command::Init(_) | Command::Status(_) => return None,
    };
    load_or_default(explicit).ok()?.system.log_level
}

async fn run_session(args: &CliArgs, run_args: RunArgs) -> Result<()> {
    let cfg = load_or_default(run_args.config.as_deref()).context("loading config")?;
    let specs = task_specs(run_args.tasks.as_deref(), &cfg)?;
    let graph = TaskGraph::build(specs);

    let workspace = run_args
        .workspace
        .unwrap_or_else(|| cfg.system.workspace.clone());
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("creating workspace '{}'", workspace.display()))?;

    let client = HttpWorkerClient::new(cfg.retry_policy())?;
    let supervisor = ProcessSupervisor::from_current_exe(
        cfg.system.code_tool.clone(),
        worker_log_level(args, &cfg),
        &client,
    )?;

    info!(
        tasks = graph.len(),
        workers = cfg.agents.len(),
        workspace = %workspace.display(),
        "starting session"
    );

    let report = Session::new(supervisor, client, cfg.worker_specs(Some(&workspace)))
        .with_poller(cfg.poller())
        .with_readiness_timeout(cfg.readiness_timeout())
        .run(graph)
        .await?;

    print_summary(&report.summary);

    match report.outcome {
        WaitOutcome::Completed => Ok(()),
        WaitOutcome::TimedOut => bail!(
            "session timed out after {}s with {}/{} tasks completed",
            cfg.system.timeout_secs,
            report.summary.completed,
            report.summary.total_tasks
        ),
        WaitOutcome::Stalled => bail!(
            "session stalled with {}/{} tasks completed ({} failed)",
            report.summary.completed,
            report.summary.total_tasks,
            report.summary.failed
        ),
    }
}

/// Level handed to spawned workers. An `AGENT_COLLAB_LOG` value is
/// inherited through the environment, so it is not repeated here.
fn worker_log_level(args: &CliArgs, cfg: &ConfigFile) -> Option<String> {
    if let Some(level) = args.log_level {
        return Some(level.as_str().to_string());
    }
    if std::env::var_os(logging::LOG_ENV_VAR).is_some() {
        return None;
    }
    cfg.system.log_level.clone()
}

fn task_specs(tasks: Option<&Path>, cfg: &ConfigFile) -> Result<Vec<TaskSpec>> {
    match tasks {
        Some(path) => plan::load_task_file(path)
            .with_context(|| format!("reading task list '{}'", path.display())),
        None => {
            debug!("no task list given; planning from configured task types");
            Ok(plan::from_task_types(cfg))
        }
    }
}

fn print_plan(plan_args: PlanArgs) -> Result<()> {
    let cfg = load_or_default(plan_args.config.as_deref()).context("loading config")?;
    let graph = TaskGraph::build(task_specs(plan_args.tasks.as_deref(), &cfg)?);
    let order = order(&graph);

    println!("agent-collab plan");
    println!("execution order ({} of {} tasks):", order.len(), graph.len());
    for (pos, &idx) in order.iter().enumerate() {
        let task = graph.task(idx);
        println!(
            "  {:>2}. {} [{}] (priority {}, agent {})",
            pos + 1,
            task.title,
            task.id,
            task.priority,
            task.owner
        );
        if !task.dependencies.is_empty() {
            println!("      after: {}", task.dependencies.join(", "));
        }
    }

    let skipped = unschedulable(&graph, &order);
    if !skipped.is_empty() {
        let cycles = graph.cycle_members();
        println!();
        println!("unschedulable ({}):", skipped.len());
        for idx in skipped {
            let reason = if cycles.contains(&idx) {
                "dependency cycle"
            } else {
                "depends on a cycle"
            };
            println!("  - {} ({reason})", graph.task(idx).title);
        }
    }

    for task in graph.tasks() {
        if !cfg.agents.contains_key(&task.owner) {
            println!("warning: '{}' is owned by unknown agent '{}'", task.title, task.owner);
        }
    }

    Ok(())
}

fn validate(validate_args: ValidateArgs) -> Result<()> {
    let cfg = load_or_default(validate_args.config.as_deref()).context("loading config")?;
    println!(
        "config OK: {} agents, {} task types",
        cfg.agents.len(),
        cfg.task_types.len()
    );
    for (name, agent) in &cfg.agents {
        println!("  - {name}: {} on port {}", agent.role(), agent.port);
    }
    Ok(())
}

async fn run_worker(worker_args: WorkerArgs) -> Result<()> {
    let role = AgentRole::from_tag(
        worker_args
            .role
            .as_deref()
            .unwrap_or(worker_args.name.as_str()),
    );
    let runner = Arc::new(ToolRunner::new(worker_args.tool));
    let executor = TaskExecutor::new(worker_args.name, role, &worker_args.workspace, runner)
        .await
        .context("initialising worker")?;

    worker::serve(executor, worker_args.port).await?;
    Ok(())
}

fn init(init_args: InitArgs) -> Result<()> {
    let report = workspace::init_workspace(
        &init_args.workspace,
        init_args.config.as_deref(),
        init_args.force,
    )
    .with_context(|| format!("initialising '{}'", init_args.workspace.display()))?;

    println!("Workspace initialized at: {}", init_args.workspace.display());
    println!("Configuration saved to: {}", report.config_path.display());
    Ok(())
}

fn status(status_args: StatusArgs) -> Result<()> {
    let path = &status_args.workspace;
    let Some(status) = workspace::inspect_workspace(path)
        .with_context(|| format!("inspecting '{}'", path.display()))?
    else {
        println!("Workspace does not exist: {}", path.display());
        return Ok(());
    };

    println!("Workspace: {}", path.display());
    match &status.docs {
        Some(docs) => {
            println!("docs:");
            for doc in docs {
                println!("  - {doc}");
            }
        }
        None => println!("docs: not found"),
    }
    println!("agent workspaces:");
    for agent in &status.agents {
        println!("  - agent_{} ({} files)", agent.name, agent.files);
    }
    match &status.config {
        Some(config) => println!("config: {}", config.display()),
        None => println!("config: not found"),
    }
    Ok(())
}

fn print_summary(summary: &StatusSummary) {
    println!(
        "tasks: {} total, {} completed, {} in progress, {} assigned, {} not started, {} failed",
        summary.total_tasks,
        summary.completed,
        summary.in_progress,
        summary.assigned,
        summary.not_started,
        summary.failed
    );
    for task in &summary.tasks {
        println!("  {}", task.line());
    }
}

// src/workspace.rs

//! Workspace layout: scaffolding for `init` and inspection for `status`.
//!
//! ```text
//! <workspace>/
//!   AgentCollab.toml
//!   docs/
//!   agent_<name>/task_<id>_<suffix>.md
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{ConfigFile, default_config_path};
use crate::errors::{CollabError, Result};

pub const DOCS_DIR: &str = "docs";

const AGENT_DIR_PREFIX: &str = "agent_";

/// Directory a worker named `name` writes into.
pub fn agent_dir(workspace: &Path, name: &str) -> PathBuf {
    workspace.join(format!("{AGENT_DIR_PREFIX}{name}"))
}

/// What `init` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub config_path: PathBuf,
    pub created_dirs: Vec<PathBuf>,
}

/// Write the built-in config and create `docs/` plus one directory per
/// built-in agent.
///
/// An existing config file is only replaced with `force`.
pub fn init_workspace(
    workspace: &Path,
    config_path: Option<&Path>,
    force: bool,
) -> Result<InitReport> {
    fs::create_dir_all(workspace)?;

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace.join(default_config_path()));
    if config_path.exists() && !force {
        return Err(CollabError::ConfigError(format!(
            "'{}' already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    let cfg = ConfigFile::default();
    let rendered = toml::to_string(&cfg)
        .map_err(|e| CollabError::ConfigError(format!("rendering default config: {e}")))?;
    fs::write(&config_path, rendered)?;

    let mut created_dirs = vec![workspace.join(DOCS_DIR)];
    created_dirs.extend(cfg.agents.keys().map(|name| agent_dir(workspace, name)));
    for dir in &created_dirs {
        fs::create_dir_all(dir)?;
    }

    info!(
        workspace = %workspace.display(),
        config = %config_path.display(),
        "workspace initialised"
    );
    Ok(InitReport {
        config_path,
        created_dirs,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirStatus {
    pub name: String,
    /// Visible entries; the transient prompt file is hidden.
    pub files: usize,
}

/// Snapshot of a workspace directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceStatus {
    /// Markdown files under `docs/`, or `None` without that directory.
    pub docs: Option<Vec<String>>,
    pub agents: Vec<AgentDirStatus>,
    pub config: Option<PathBuf>,
}

/// Inspect `workspace`, or `None` if it does not exist.
pub fn inspect_workspace(workspace: &Path) -> Result<Option<WorkspaceStatus>> {
    if !workspace.is_dir() {
        debug!(workspace = %workspace.display(), "workspace does not exist");
        return Ok(None);
    }

    let docs_dir = workspace.join(DOCS_DIR);
    let docs = if docs_dir.is_dir() {
        let mut docs: Vec<String> = visible_entries(&docs_dir)?
            .into_iter()
            .filter(|name| name.ends_with(".md"))
            .collect();
        docs.sort();
        Some(docs)
    } else {
        None
    };

    let mut agents = Vec::new();
    for entry in fs::read_dir(workspace)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(name) = dir_name.strip_prefix(AGENT_DIR_PREFIX) {
            agents.push(AgentDirStatus {
                name: name.to_string(),
                files: visible_entries(&entry.path())?.len(),
            });
        }
    }
    agents.sort_by(|a, b| a.name.cmp(&b.name));

    let config_path = workspace.join(default_config_path());
    let config = config_path.is_file().then_some(config_path);

    Ok(Some(WorkspaceStatus {
        docs,
        agents,
        config,
    }))
}

fn visible_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    Ok(names)
}

// src/plan.rs

//! Building task specs from a markdown task list or from configured task
//! types.
//!
//! Task list lines look like:
//!
//! ```text
//! - [ ] **implement_api** - Implement REST API (Priority: 2, Agent: developer, Dependencies: setup_project)
//! ```
//!
//! `Priority` defaults to 5, `Agent` to `developer`. `Dependencies` takes the
//! rest of the metadata as a comma-separated list of titles; a missing value,
//! an empty value or `none` means no dependencies. Lines that do not follow
//! the pattern are ignored.

use std::path::Path;

use tracing::debug;

use crate::config::ConfigFile;
use crate::dag::TaskSpec;
use crate::errors::Result;

const CHECKBOX: &str = "- [ ] **";

/// Parse every task line in `content`, in document order.
pub fn parse_task_list(content: &str) -> Vec<TaskSpec> {
    content.lines().filter_map(parse_task_line).collect()
}

/// Read and parse a task list file.
pub fn load_task_file(path: impl AsRef<Path>) -> Result<Vec<TaskSpec>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let specs = parse_task_list(&content);
    debug!(path = %path.display(), tasks = specs.len(), "parsed task list");
    Ok(specs)
}

/// Parse a single line, or `None` if it is not a task line.
pub fn parse_task_line(line: &str) -> Option<TaskSpec> {
    let start = line.find(CHECKBOX)?;
    let rest = &line[start + CHECKBOX.len()..];

    let (title, rest) = rest.split_once("**")?;
    if title.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix(" - ")?;

    let (description, rest) = rest.split_once('(')?;
    let (metadata, _) = rest.split_once(')')?;

    let mut spec = TaskSpec::new(title.trim());
    spec.description = description.trim().to_string();

    if let Some(priority) = field(metadata, "Priority:").and_then(leading_int) {
        spec.priority = priority;
    }
    if let Some(agent) = field(metadata, "Agent:").map(leading_word) {
        if !agent.is_empty() {
            spec.owner = agent.to_string();
        }
    }
    if let Some(deps) = field(metadata, "Dependencies:") {
        spec.dependencies = parse_dependencies(deps);
    }

    Some(spec)
}

/// Text following `key` inside the metadata, with leading spaces removed.
fn field<'a>(metadata: &'a str, key: &str) -> Option<&'a str> {
    metadata
        .find(key)
        .map(|pos| metadata[pos + key.len()..].trim_start())
}

fn leading_int(s: &str) -> Option<i64> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn parse_dependencies(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|dep| !dep.is_empty())
        .map(str::to_string)
        .collect()
}

/// One task per configured task type, in declaration order; the task type
/// name is both the title and the task kind.
pub fn from_task_types(cfg: &ConfigFile) -> Vec<TaskSpec> {
    cfg.task_types
        .iter()
        .map(|(name, task_type)| TaskSpec {
            title: name.clone(),
            description: task_type
                .description
                .clone()
                .unwrap_or_else(|| name.replace('_', " ")),
            owner: task_type.agent.clone(),
            priority: task_type.priority,
            dependencies: task_type.dependencies.clone(),
            kind: name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults_apply() {
        let spec = parse_task_line("- [ ] **docs** - Write docs (Agent: qa)").unwrap();
        assert_eq!(spec.priority, 5);
        assert_eq!(spec.owner, "qa");

        let spec = parse_task_line("- [ ] **docs** - Write docs (Priority: 2)").unwrap();
        assert_eq!(spec.owner, "developer");
        assert_eq!(spec.priority, 2);
    }

    #[test]
    fn lines_without_metadata_are_ignored() {
        assert!(parse_task_line("- [ ] **docs** - Write docs").is_none());
        assert!(parse_task_line("- [x] **docs** - Write docs (Priority: 1)").is_none());
        assert!(parse_task_line("## Development Tasks").is_none());
    }

    #[test]
    fn dependencies_none_means_empty() {
        let spec =
            parse_task_line("- [ ] **a** - A (Priority: 1, Agent: dev, Dependencies: none)")
                .unwrap();
        assert!(spec.dependencies.is_empty());

        let spec =
            parse_task_line("- [ ] **a** - A (Priority: 1, Agent: dev, Dependencies: )").unwrap();
        assert!(spec.dependencies.is_empty());
    }
}

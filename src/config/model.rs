// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dag::DEFAULT_PRIORITY;
use crate::engine::Poller;
use crate::retry::RetryPolicy;
use crate::session::WorkerSpec;
use crate::types::{AgentName, AgentRole};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [system]
/// workspace = "./workspace"
/// timeout_secs = 3600
///
/// [system.retry]
/// max_attempts = 3
///
/// [agents.developer]
/// role = "code_implementation"
/// port = 8001
///
/// [task_types.unit_testing]
/// agent = "qa"
/// priority = 5
/// dependencies = ["code_implementation"]
/// ```
///
/// Every section is optional. Without `[agents]` the built-in roster is used,
/// and then a missing `[task_types]` falls back to the built-in task types.
/// A custom roster without `[task_types]` has no task types.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub system: SystemSection,

    #[serde(default)]
    pub agents: Option<BTreeMap<AgentName, AgentConfig>>,

    #[serde(default)]
    pub task_types: Option<TaskTypes>,
}

/// Validated configuration. Construct through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub system: SystemSection,
    pub agents: BTreeMap<AgentName, AgentConfig>,
    pub task_types: TaskTypes,
}

/// `[system]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSection {
    /// Root directory; each worker writes into `agent_<name>/` below it.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Used when neither `--log-level` nor `AGENT_COLLAB_LOG` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Session completion wait.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_readiness_timeout_secs")]
    pub readiness_timeout_secs: u64,

    /// Program the workers run for each task.
    #[serde(default = "default_code_tool")]
    pub code_tool: String,

    #[serde(default)]
    pub retry: RetrySection,
}

fn default_workspace() -> PathBuf {
    PathBuf::from("./workspace")
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_readiness_timeout_secs() -> u64 {
    30
}

fn default_code_tool() -> String {
    "claude-code".to_string()
}

impl Default for SystemSection {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            log_level: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            readiness_timeout_secs: default_readiness_timeout_secs(),
            code_tool: default_code_tool(),
            retry: RetrySection::default(),
        }
    }
}

/// `[system.retry]` section, backoff for worker requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// `[agents.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Role tag such as `"quality_assurance"`; unknown tags run as generic.
    pub role: String,
    pub port: u16,
}

impl AgentConfig {
    pub fn new(role: AgentRole, port: u16) -> Self {
        Self {
            role: role.as_tag().to_string(),
            port,
        }
    }

    pub fn role(&self) -> AgentRole {
        AgentRole::from_tag(&self.role)
    }
}

/// `[task_types.<name>]` section. The table key doubles as the task title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTypeConfig {
    pub agent: AgentName,
    #[serde(default = "default_task_priority")]
    pub priority: i64,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_task_priority() -> i64 {
    DEFAULT_PRIORITY
}

impl TaskTypeConfig {
    fn new(agent: &str, priority: i64, dependencies: &[&str]) -> Self {
        Self {
            agent: agent.to_string(),
            priority,
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            description: None,
        }
    }
}

/// `[task_types]` entries in document order.
///
/// The order fixes the `task_<n>` ids of a plan built from task types, and
/// with them the tie-break between equal priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTypes(Vec<(String, TaskTypeConfig)>);

impl TaskTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an existing entry in place, or append a new one.
    pub fn insert(&mut self, name: impl Into<String>, task_type: TaskTypeConfig) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = task_type,
            None => self.0.push((name, task_type)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TaskTypeConfig> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, task_type)| task_type)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TaskTypeConfig)> {
        self.0.iter().map(|(name, task_type)| (name, task_type))
    }
}

impl FromIterator<(String, TaskTypeConfig)> for TaskTypes {
    fn from_iter<I: IntoIterator<Item = (String, TaskTypeConfig)>>(iter: I) -> Self {
        let mut task_types = TaskTypes::new();
        for (name, task_type) in iter {
            task_types.insert(name, task_type);
        }
        task_types
    }
}

impl Serialize for TaskTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, task_type) in &self.0 {
            map.serialize_entry(name, task_type)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TaskTypesVisitor;

        impl<'de> Visitor<'de> for TaskTypesVisitor {
            type Value = TaskTypes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of task types")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<TaskTypes, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut task_types = TaskTypes::new();
                while let Some((name, task_type)) =
                    access.next_entry::<String, TaskTypeConfig>()?
                {
                    task_types.insert(name, task_type);
                }
                Ok(task_types)
            }
        }

        deserializer.deserialize_map(TaskTypesVisitor)
    }
}

/// Built-in worker roster.
pub fn default_agents() -> BTreeMap<AgentName, AgentConfig> {
    [
        ("developer", AgentRole::CodeImplementation, 8001),
        ("qa", AgentRole::QualityAssurance, 8002),
        ("designer", AgentRole::UiUxDesign, 8003),
        ("architect", AgentRole::SystemArchitecture, 8004),
    ]
    .into_iter()
    .map(|(name, role, port)| (name.to_string(), AgentConfig::new(role, port)))
    .collect()
}

/// Built-in task types, used as the plan when no task list is given.
pub fn default_task_types() -> TaskTypes {
    [
        ("requirements_analysis", TaskTypeConfig::new("architect", 1, &[])),
        (
            "architecture_design",
            TaskTypeConfig::new("architect", 2, &["requirements_analysis"]),
        ),
        (
            "ui_design",
            TaskTypeConfig::new("designer", 3, &["requirements_analysis"]),
        ),
        (
            "code_implementation",
            TaskTypeConfig::new("developer", 4, &["architecture_design"]),
        ),
        (
            "unit_testing",
            TaskTypeConfig::new("qa", 5, &["code_implementation"]),
        ),
        (
            "integration_testing",
            TaskTypeConfig::new("qa", 6, &["unit_testing"]),
        ),
    ]
    .into_iter()
    .map(|(name, cfg)| (name.to_string(), cfg))
    .collect()
}

impl ConfigFile {
    /// Assemble a config without validation; callers go through `TryFrom`.
    pub(crate) fn new_unchecked(
        system: SystemSection,
        agents: BTreeMap<AgentName, AgentConfig>,
        task_types: TaskTypes,
    ) -> Self {
        Self {
            system,
            agents,
            task_types,
        }
    }

    /// Worker processes to start, in name order.
    ///
    /// `workspace` overrides `[system].workspace` when given.
    pub fn worker_specs(&self, workspace: Option<&Path>) -> Vec<WorkerSpec> {
        let workspace = workspace.unwrap_or(&self.system.workspace);
        self.agents
            .iter()
            .map(|(name, agent)| WorkerSpec {
                name: name.clone(),
                role: agent.role(),
                port: agent.port,
                workspace: workspace.to_path_buf(),
            })
            .collect()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = &self.system.retry;
        RetryPolicy::new(
            retry.max_attempts,
            Duration::from_millis(retry.base_delay_ms),
            Duration::from_millis(retry.max_delay_ms),
        )
    }

    pub fn poller(&self) -> Poller {
        Poller::new(
            Duration::from_secs(self.system.poll_interval_secs),
            Duration::from_secs(self.system.timeout_secs),
        )
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.system.readiness_timeout_secs)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            SystemSection::default(),
            default_agents(),
            default_task_types(),
        )
    }
}

#![allow(dead_code)]

use std::collections::BTreeMap;

use agent_collab::config::{
    AgentConfig, ConfigFile, RawConfigFile, SystemSection, TaskTypeConfig, TaskTypes,
};
use agent_collab::dag::{TaskGraph, TaskSpec};
use agent_collab::engine::{AgentRegistry, WorkerRecord};
use agent_collab::types::AgentRole;

/// Builder for `TaskSpec`.
#[derive(Debug, Clone)]
pub struct TaskSpecBuilder {
    spec: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            spec: TaskSpec::new(title),
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.spec.priority = priority;
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.spec.owner = owner.to_string();
        self
    }

    pub fn after(mut self, deps: &[&str]) -> Self {
        self.spec.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.spec.description = description.to_string();
        self
    }

    pub fn build(self) -> TaskSpec {
        self.spec
    }
}

/// Build a graph from `(title, priority, deps)` triples owned by `developer`.
pub fn graph(tasks: &[(&str, i64, &[&str])]) -> TaskGraph {
    TaskGraph::build(
        tasks
            .iter()
            .map(|(title, priority, deps)| {
                TaskSpecBuilder::new(title)
                    .priority(*priority)
                    .after(deps)
                    .build()
            }),
    )
}

/// Endpoint the fake worker client uses for an agent name.
pub fn endpoint_for(name: &str) -> String {
    format!("fake://{name}")
}

/// Registry with one generic worker per name, each at [`endpoint_for`].
pub fn registry_for(names: &[&str]) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for name in names {
        registry.register(WorkerRecord::new(
            *name,
            AgentRole::Generic,
            endpoint_for(name),
        ));
    }
    registry
}

/// Builder for `ConfigFile` that starts from an empty roster.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                system: SystemSection::default(),
                agents: Some(BTreeMap::new()),
                task_types: Some(TaskTypes::new()),
            },
        }
    }

    pub fn with_agent(mut self, name: &str, role: AgentRole, port: u16) -> Self {
        self.config
            .agents
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), AgentConfig::new(role, port));
        self
    }

    pub fn with_task_type(mut self, name: &str, agent: &str, priority: i64, deps: &[&str]) -> Self {
        self.config
            .task_types
            .get_or_insert_with(TaskTypes::new)
            .insert(
                name.to_string(),
                TaskTypeConfig {
                    agent: agent.to_string(),
                    priority,
                    dependencies: deps.iter().map(|d| d.to_string()).collect(),
                    description: None,
                },
            );
        self
    }

    pub fn with_system(mut self, f: impl FnOnce(&mut SystemSection)) -> Self {
        f(&mut self.config.system);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

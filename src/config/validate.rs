// src/config/validate.rs

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::config::model::{
    AgentConfig, ConfigFile, RawConfigFile, TaskTypes, default_agents, default_task_types,
};
use crate::errors::{CollabError, Result};

/// Lowest port a worker may listen on.
const MIN_PORT: u16 = 1024;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CollabError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        // The built-in task types name the built-in agents, so they only
        // apply together with the built-in roster.
        let (agents, task_types) = match raw.agents {
            Some(agents) => (agents, raw.task_types.unwrap_or_default()),
            None => (
                default_agents(),
                raw.task_types.unwrap_or_else(default_task_types),
            ),
        };
        let config = ConfigFile::new_unchecked(raw.system, agents, task_types);
        validate_config(&config)?;
        Ok(config)
    }
}

/// Check the invariants every consumer of a [`ConfigFile`] relies on.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_agents(&cfg.agents)?;
    validate_system(cfg)?;
    validate_agents(&cfg.agents)?;
    validate_task_types(&cfg.task_types, &cfg.agents)?;
    Ok(())
}

fn ensure_has_agents(agents: &BTreeMap<String, AgentConfig>) -> Result<()> {
    if agents.is_empty() {
        return Err(CollabError::ConfigError(
            "config must contain at least one [agents.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_system(cfg: &ConfigFile) -> Result<()> {
    if cfg.system.poll_interval_secs == 0 {
        return Err(CollabError::ConfigError(
            "[system].poll_interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.system.retry.max_attempts == 0 {
        return Err(CollabError::ConfigError(
            "[system.retry].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_agents(agents: &BTreeMap<String, AgentConfig>) -> Result<()> {
    let mut ports: HashMap<u16, &str> = HashMap::new();

    for (name, agent) in agents {
        if !is_valid_agent_name(name) {
            return Err(CollabError::ConfigError(format!(
                "agent name '{}' must only contain letters, digits, '_' or '-'",
                name
            )));
        }
        if agent.port < MIN_PORT {
            return Err(CollabError::ConfigError(format!(
                "agent '{}' port {} is outside {}..=65535",
                name, agent.port, MIN_PORT
            )));
        }
        if let Some(other) = ports.insert(agent.port, name.as_str()) {
            return Err(CollabError::ConfigError(format!(
                "agents '{}' and '{}' both use port {}",
                other, name, agent.port
            )));
        }
    }
    Ok(())
}

fn is_valid_agent_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_task_types(
    task_types: &TaskTypes,
    agents: &BTreeMap<String, AgentConfig>,
) -> Result<()> {
    for (name, task_type) in task_types.iter() {
        if !agents.contains_key(&task_type.agent) {
            return Err(CollabError::ConfigError(format!(
                "task type '{}' refers to unknown agent '{}'",
                name, task_type.agent
            )));
        }
        for dep in &task_type.dependencies {
            if !task_types.contains_key(dep) {
                warn!(task_type = %name, dependency = %dep, "dependency matches no task type and will not block");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_uses_builtin_roster() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.agents.len(), 4);
        assert_eq!(cfg.agents["qa"].port, 8002);
        assert_eq!(cfg.task_types.len(), 6);
    }

    #[test]
    fn custom_roster_without_task_types_has_none() {
        let cfg = parse("[agents.dev]\nrole = \"code_implementation\"\nport = 9000\n").unwrap();
        assert_eq!(cfg.agents.len(), 1);
        assert!(cfg.task_types.is_empty());
    }

    #[test]
    fn task_types_keep_document_order() {
        let cfg = parse(
            r#"
            [agents.dev]
            role = "generic"
            port = 9000
            [task_types.zeta]
            agent = "dev"
            [task_types.alpha]
            agent = "dev"
            [task_types.mid]
            agent = "dev"
            "#,
        )
        .unwrap();
        let names: Vec<_> = cfg.task_types.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let err = parse(
            r#"
            [agents.a]
            role = "generic"
            port = 9000
            [agents.b]
            role = "generic"
            port = 9000
            [task_types]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both use port 9000"));
    }

    #[test]
    fn privileged_ports_are_rejected() {
        let err = parse(
            r#"
            [agents.a]
            role = "generic"
            port = 80
            [task_types]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("outside 1024..=65535"));
    }

    #[test]
    fn names_with_spaces_are_rejected() {
        let err = parse(
            r#"
            [agents."my agent"]
            role = "generic"
            port = 9000
            [task_types]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CollabError::ConfigError(_)));
    }

    #[test]
    fn task_type_agent_must_exist() {
        let err = parse(
            r#"
            [agents.dev]
            role = "code_implementation"
            port = 9000
            [task_types.build]
            agent = "ops"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown agent 'ops'"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = parse("[system]\npoll_interval_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }
}

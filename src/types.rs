// src/types.rs

//! Small shared enums used by both the orchestrator and the worker side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical agent (worker) name type.
pub type AgentName = String;

/// Capability of a worker.
///
/// Role tags are the snake_case strings used in config files and on the
/// worker command line (`code_implementation`, `quality_assurance`, ...).
/// Any tag that is not recognised falls back to [`AgentRole::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    CodeImplementation,
    QualityAssurance,
    UiUxDesign,
    SystemArchitecture,
    Generic,
}

impl AgentRole {
    /// Parse a role tag, falling back to `Generic` for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "code_implementation" => AgentRole::CodeImplementation,
            "quality_assurance" => AgentRole::QualityAssurance,
            "ui_ux_design" => AgentRole::UiUxDesign,
            "system_architecture" => AgentRole::SystemArchitecture,
            _ => AgentRole::Generic,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            AgentRole::CodeImplementation => "code_implementation",
            AgentRole::QualityAssurance => "quality_assurance",
            AgentRole::UiUxDesign => "ui_ux_design",
            AgentRole::SystemArchitecture => "system_architecture",
            AgentRole::Generic => "generic",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for AgentRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AgentRole::from_tag(s))
    }
}

/// Status a worker reports about itself on `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    #[default]
    Idle,
    Working,
    Error,
}

/// Orchestrator-side view of whether a worker process is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    #[default]
    Starting,
    Ready,
    Unreachable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_tags_fall_back_to_generic() {
        assert_eq!(AgentRole::from_tag("ui_ux_design"), AgentRole::UiUxDesign);
        assert_eq!(AgentRole::from_tag(" Quality_Assurance "), AgentRole::QualityAssurance);
        assert_eq!(AgentRole::from_tag("developer"), AgentRole::Generic);
        assert_eq!(AgentRole::from_tag(""), AgentRole::Generic);
    }

    #[test]
    fn worker_status_uses_lowercase_on_the_wire() {
        let json = serde_json::to_string(&WorkerStatus::Working).unwrap();
        assert_eq!(json, "\"working\"");
        let parsed: WorkerStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, WorkerStatus::Error);
    }
}

// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollabError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent '{agent}' failed to start: {reason}")]
    AgentStartup { agent: String, reason: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unresolved dependency: {0}")]
    Dependency(String),

    #[error("Task execution failed: {0}")]
    TaskExecution(String),

    #[error("Communication error with {endpoint}: {message}")]
    Communication { endpoint: String, message: String },

    /// The request never reached the worker (connection refused, DNS, ...).
    #[error("Worker at {endpoint} is unreachable: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollabError {
    pub fn communication(endpoint: impl Into<String>, message: impl ToString) -> Self {
        CollabError::Communication {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn unreachable(endpoint: impl Into<String>, message: impl ToString) -> Self {
        CollabError::Unreachable {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from the network layer (as opposed to a
    /// worker-reported or local failure).
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            CollabError::Communication { .. } | CollabError::Unreachable { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CollabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CollabError::communication("http://localhost:8001", "connection refused");
        assert_eq!(
            err.to_string(),
            "Communication error with http://localhost:8001: connection refused"
        );
        assert!(err.is_communication());

        let err = CollabError::Timeout {
            what: "agent 'qa' readiness".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "agent 'qa' readiness timed out after 30s");
        assert!(!err.is_communication());
    }
}

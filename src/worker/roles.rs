// src/worker/roles.rs

//! Role-specific handling of a task on the worker side.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::protocol::TaskPayload;
use crate::types::AgentRole;
use crate::worker::runner::CodeRunner;

/// Fixed text that shapes a role's prompt and result file.
#[derive(Debug, Clone, Copy)]
struct RoleProfile {
    fallback_title: &'static str,
    focus_intro: &'static str,
    focus: &'static [&'static str],
    header: &'static str,
    file_suffix: &'static str,
}

const DEVELOPMENT: RoleProfile = RoleProfile {
    fallback_title: "Development Task",
    focus_intro: "Please implement the requested functionality. Focus on:",
    focus: &[
        "Writing clean, maintainable code",
        "Following best practices",
        "Adding appropriate error handling",
        "Including relevant comments",
        "Ensuring the code is testable",
    ],
    header: "Development Task Result",
    file_suffix: "result",
};

const QUALITY_ASSURANCE: RoleProfile = RoleProfile {
    fallback_title: "QA Task",
    focus_intro: "Please create comprehensive tests for the functionality. Include:",
    focus: &[
        "Unit tests for individual components",
        "Integration tests for component interactions",
        "Edge case testing",
        "Error handling validation",
        "Performance considerations",
        "Test documentation",
    ],
    header: "QA Task Result",
    file_suffix: "tests",
};

const DESIGN: RoleProfile = RoleProfile {
    fallback_title: "Design Task",
    focus_intro: "Please create UI/UX designs focusing on:",
    focus: &[
        "User experience and usability",
        "Visual design and aesthetics",
        "Responsive design principles",
        "Accessibility considerations",
        "Design system consistency",
        "User interface specifications",
    ],
    header: "Design Task Result",
    file_suffix: "design",
};

const ARCHITECTURE: RoleProfile = RoleProfile {
    fallback_title: "Architecture Task",
    focus_intro: "Please design the system architecture considering:",
    focus: &[
        "System components and their relationships",
        "Data flow and processing patterns",
        "Scalability and performance requirements",
        "Security considerations",
        "Technology stack recommendations",
        "Deployment and infrastructure needs",
    ],
    header: "Architecture Task Result",
    file_suffix: "architecture",
};

const GENERIC: RoleProfile = RoleProfile {
    fallback_title: "Generic Task",
    focus_intro: "Please complete this task with attention to:",
    focus: &[
        "Understanding the requirements clearly",
        "Providing a comprehensive solution",
        "Considering edge cases and limitations",
        "Documenting the approach and results",
        "Ensuring quality and completeness",
    ],
    header: "Generic Task Result",
    file_suffix: "generic",
};

impl AgentRole {
    fn profile(&self) -> &'static RoleProfile {
        match self {
            AgentRole::CodeImplementation => &DEVELOPMENT,
            AgentRole::QualityAssurance => &QUALITY_ASSURANCE,
            AgentRole::UiUxDesign => &DESIGN,
            AgentRole::SystemArchitecture => &ARCHITECTURE,
            AgentRole::Generic => &GENERIC,
        }
    }

    /// Instruction text handed to the code tool for `task`.
    pub fn prompt(&self, task: &TaskPayload) -> String {
        let profile = self.profile();
        let title = if task.title.is_empty() {
            profile.fallback_title
        } else {
            task.title.as_str()
        };

        let mut prompt = format!(
            "Task: {title}\nDescription: {}\n\n{}\n",
            task.description, profile.focus_intro
        );
        for (i, item) in profile.focus.iter().enumerate() {
            prompt.push_str(&format!("{}. {item}\n", i + 1));
        }
        prompt
    }

    /// Where the outcome of `task` is written inside the agent workspace.
    pub fn result_path(&self, agent_workspace: &Path, task: &TaskPayload) -> PathBuf {
        let id = if task.id.is_empty() { "unknown" } else { task.id.as_str() };
        agent_workspace.join(format!("task_{id}_{}.md", self.profile().file_suffix))
    }

    /// Run `task` through the code tool and persist the outcome.
    pub async fn handle(
        &self,
        task: &TaskPayload,
        agent_workspace: &Path,
        runner: &dyn CodeRunner,
    ) -> Result<String> {
        let prompt = self.prompt(task);
        let result = runner.run(&prompt, agent_workspace).await?;

        let path = self.result_path(agent_workspace, task);
        let body = format!("# {}\n\n{result}", self.profile().header);
        tokio::fs::write(&path, body).await?;
        debug!(task = %task.id, role = %self, path = %path.display(), "wrote task result");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str, title: &str) -> TaskPayload {
        TaskPayload {
            id: id.to_string(),
            title: title.to_string(),
            description: "Build the login form".to_string(),
            task_type: "generic".to_string(),
            priority: 3,
        }
    }

    #[test]
    fn prompt_lists_role_focus_points() {
        let prompt = AgentRole::QualityAssurance.prompt(&payload("task_1", "login tests"));
        assert!(prompt.starts_with("Task: login tests\nDescription: Build the login form\n"));
        assert!(prompt.contains("1. Unit tests for individual components\n"));
        assert!(prompt.contains("6. Test documentation\n"));
    }

    #[test]
    fn empty_title_uses_role_fallback() {
        let prompt = AgentRole::SystemArchitecture.prompt(&payload("task_1", ""));
        assert!(prompt.starts_with("Task: Architecture Task\n"));
    }

    #[test]
    fn result_files_are_named_per_role() {
        let ws = Path::new("/ws/agent_qa");
        assert_eq!(
            AgentRole::QualityAssurance.result_path(ws, &payload("task_3", "t")),
            ws.join("task_task_3_tests.md")
        );
        assert_eq!(
            AgentRole::CodeImplementation.result_path(ws, &payload("", "t")),
            ws.join("task_unknown_result.md")
        );
    }
}

use std::error::Error;

use agent_collab::config::{ConfigFile, load_and_validate};
use agent_collab::errors::CollabError;
use agent_collab::workspace::{AgentDirStatus, agent_dir, init_workspace, inspect_workspace};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn init_writes_a_loadable_default_config_and_agent_dirs() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ws = dir.path().join("ws");

    let report = init_workspace(&ws, None, false)?;

    assert_eq!(report.config_path, ws.join("AgentCollab.toml"));
    assert!(ws.join("docs").is_dir());
    for name in ["architect", "designer", "developer", "qa"] {
        assert!(agent_dir(&ws, name).is_dir(), "missing agent_{name}");
    }

    let loaded = load_and_validate(&report.config_path)?;
    let defaults = ConfigFile::default();
    assert_eq!(loaded.agents, defaults.agents);
    assert_eq!(loaded.task_types, defaults.task_types);
    Ok(())
}

#[test]
fn init_keeps_an_existing_config_unless_forced() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "# hand edited\n")?;

    let err = init_workspace(dir.path(), Some(&config), false).unwrap_err();
    assert!(matches!(err, CollabError::ConfigError(_)));
    assert_eq!(std::fs::read_to_string(&config)?, "# hand edited\n");

    init_workspace(dir.path(), Some(&config), true)?;
    assert!(std::fs::read_to_string(&config)?.contains("[agents.developer]"));
    Ok(())
}

#[test]
fn status_of_a_missing_workspace_is_none() -> TestResult {
    let dir = tempfile::tempdir()?;
    assert!(inspect_workspace(&dir.path().join("nope"))?.is_none());
    Ok(())
}

#[test]
fn status_reports_docs_agent_files_and_config() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ws = dir.path();
    init_workspace(ws, None, false)?;

    std::fs::write(ws.join("docs").join("README.md"), "# docs")?;
    std::fs::write(ws.join("docs").join("notes.txt"), "skip")?;
    let qa = agent_dir(ws, "qa");
    std::fs::write(qa.join("task_task_1_tests.md"), "# QA Task Result")?;
    std::fs::write(qa.join(".agent-collab-prompt.txt"), "leftover")?;

    let status = inspect_workspace(ws)?.expect("workspace exists");

    assert_eq!(status.docs, Some(vec!["README.md".to_string()]));
    assert_eq!(status.config, Some(ws.join("AgentCollab.toml")));
    assert_eq!(status.agents.len(), 4);
    assert!(status.agents.contains(&AgentDirStatus {
        name: "qa".to_string(),
        files: 1,
    }));
    assert!(status.agents.contains(&AgentDirStatus {
        name: "developer".to_string(),
        files: 0,
    }));
    Ok(())
}

#[test]
fn status_without_docs_or_config() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(agent_dir(dir.path(), "solo"))?;

    let status = inspect_workspace(dir.path())?.expect("workspace exists");
    assert!(status.docs.is_none());
    assert!(status.config.is_none());
    assert_eq!(status.agents[0].name, "solo");
    Ok(())
}

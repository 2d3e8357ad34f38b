use std::error::Error;
use std::path::Path;
use std::time::Duration;

use agent_collab::config::{ConfigFile, load_and_validate, load_from_path};
use agent_collab::errors::CollabError;
use agent_collab::types::AgentRole;
use agent_collab_test_utils::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

const FULL_CONFIG: &str = r#"
[system]
workspace = "/tmp/collab"
log_level = "debug"
timeout_secs = 120
poll_interval_secs = 5
readiness_timeout_secs = 10
code_tool = "my-tool"

[system.retry]
max_attempts = 2
base_delay_ms = 50

[agents.developer]
role = "code_implementation"
port = 9101

[agents.qa]
role = "quality_assurance"
port = 9102

[task_types.code_implementation]
agent = "developer"
priority = 1

[task_types.unit_testing]
agent = "qa"
priority = 2
dependencies = ["code_implementation"]
description = "Cover the new code"
"#;

fn write_config(dir: &Path, contents: &str) -> std::io::Result<std::path::PathBuf> {
    let path = dir.join("AgentCollab.toml");
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn full_config_round_trips_through_validation() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_and_validate(write_config(dir.path(), FULL_CONFIG)?)?;

    assert_eq!(cfg.system.log_level.as_deref(), Some("debug"));
    assert_eq!(cfg.system.code_tool, "my-tool");
    assert_eq!(cfg.readiness_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.system.retry.max_delay_ms, 60_000);

    assert_eq!(cfg.agents.len(), 2);
    assert_eq!(cfg.agents["qa"].role(), AgentRole::QualityAssurance);
    assert_eq!(
        cfg.task_types.get("unit_testing").and_then(|t| t.description.as_deref()),
        Some("Cover the new code")
    );
    Ok(())
}

#[test]
fn worker_specs_follow_the_roster() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_and_validate(write_config(dir.path(), FULL_CONFIG)?)?;

    let specs = cfg.worker_specs(None);
    let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["developer", "qa"]);
    assert_eq!(specs[0].endpoint(), "http://localhost:9101");
    assert_eq!(specs[0].workspace, Path::new("/tmp/collab"));

    let overridden = cfg.worker_specs(Some(Path::new("/elsewhere")));
    assert!(overridden.iter().all(|s| s.workspace == Path::new("/elsewhere")));
    Ok(())
}

#[test]
fn unknown_role_tags_run_as_generic() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        "[agents.scribe]\nrole = \"documentation\"\nport = 9200\n[task_types]\n",
    )?;
    let cfg = load_and_validate(path)?;
    assert_eq!(cfg.agents["scribe"].role(), AgentRole::Generic);
    assert!(cfg.task_types.is_empty());
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(dir.path(), "[agentz.dev]\nrole = \"generic\"\nport = 9000\n")?;

    let err = load_from_path(path).unwrap_err();
    assert!(matches!(err, CollabError::TomlError(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/AgentCollab.toml").unwrap_err();
    assert!(matches!(err, CollabError::IoError(_)));
}

#[test]
fn default_config_is_the_builtin_roster() {
    let cfg = ConfigFile::default();
    let ports: Vec<_> = cfg.worker_specs(None).iter().map(|s| s.port).collect();
    assert_eq!(ports, [8004, 8003, 8001, 8002]);
    assert_eq!(cfg.poller().interval, Duration::from_secs(2));
    assert_eq!(cfg.poller().timeout, Duration::from_secs(3600));
}

#[test]
fn retry_section_drives_the_retry_policy() {
    let cfg = ConfigFileBuilder::new()
        .with_agent("dev", AgentRole::CodeImplementation, 9000)
        .with_system(|s| {
            s.retry.max_attempts = 4;
            s.retry.base_delay_ms = 100;
            s.retry.max_delay_ms = 250;
        })
        .build();

    let policy = cfg.retry_policy();
    assert_eq!(policy.max_attempts, 4);
    assert_eq!(policy.delay_for(0), Duration::from_millis(100));
    assert_eq!(policy.delay_for(1), Duration::from_millis(200));
    assert_eq!(policy.delay_for(2), Duration::from_millis(250));
}

#[test]
fn zero_retry_attempts_are_rejected() {
    let raw = agent_collab::config::RawConfigFile {
        system: {
            let mut s = agent_collab::config::SystemSection::default();
            s.retry.max_attempts = 0;
            s
        },
        agents: None,
        task_types: None,
    };
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn agents_only_config_is_valid_for_task_list_runs() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        "[agents.dev]\nrole = \"code_implementation\"\nport = 9000\n",
    )?;

    let cfg = load_and_validate(path)?;
    assert_eq!(cfg.agents.len(), 1);
    assert!(cfg.task_types.is_empty());
    assert_eq!(cfg.worker_specs(None)[0].endpoint(), "http://localhost:9000");
    Ok(())
}

#[test]
fn task_types_without_agents_use_the_builtin_roster() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(dir.path(), "[task_types.review]\nagent = \"qa\"\n")?;

    let cfg = load_and_validate(path)?;
    assert_eq!(cfg.agents.len(), 4);
    assert_eq!(cfg.task_types.len(), 1);
    Ok(())
}

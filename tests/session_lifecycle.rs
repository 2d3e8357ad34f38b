use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use agent_collab::dag::{TaskGraph, TaskStatus};
use agent_collab::engine::{Poller, WaitOutcome};
use agent_collab::errors::CollabError;
use agent_collab::protocol::ResultStatus;
use agent_collab::session::{Session, WorkerSpec};
use agent_collab::types::AgentRole;
use agent_collab_test_utils::{
    Behaviour, FakeSupervisor, FakeWorkerClient, SupervisorEvent, TaskSpecBuilder, init_tracing,
    within,
};

type TestResult = Result<(), Box<dyn Error>>;

fn worker(name: &str, role: AgentRole, port: u16) -> WorkerSpec {
    WorkerSpec {
        name: name.to_string(),
        role,
        port,
        workspace: PathBuf::from("/tmp/collab"),
    }
}

fn roster() -> Vec<WorkerSpec> {
    vec![
        worker("architect", AgentRole::SystemArchitecture, 9004),
        worker("developer", AgentRole::CodeImplementation, 9001),
    ]
}

fn plan() -> TaskGraph {
    TaskGraph::build(vec![
        TaskSpecBuilder::new("design").owner("architect").priority(1).build(),
        TaskSpecBuilder::new("build")
            .owner("developer")
            .priority(2)
            .after(&["design"])
            .build(),
    ])
}

#[tokio::test]
async fn happy_path_runs_everything_and_stops_every_worker() -> TestResult {
    init_tracing();
    let supervisor = FakeSupervisor::new();
    let client = FakeWorkerClient::new();

    let report = Session::new(supervisor.clone(), client.clone(), roster())
        .run(plan())
        .await?;

    assert_eq!(report.outcome, WaitOutcome::Completed);
    assert_eq!(report.summary.completed, 2);
    assert_eq!(client.submitted_titles(), ["design", "build"]);
    assert_eq!(client.submissions()[1].0, "http://localhost:9001");

    assert_eq!(
        supervisor.events(),
        [
            SupervisorEvent::Spawned("architect".into()),
            SupervisorEvent::Ready("architect".into()),
            SupervisorEvent::Spawned("developer".into()),
            SupervisorEvent::Ready("developer".into()),
            SupervisorEvent::Terminated("architect".into()),
            SupervisorEvent::Terminated("developer".into()),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn async_worker_is_polled_to_completion() -> TestResult {
    init_tracing();
    let supervisor = FakeSupervisor::new();
    let client = FakeWorkerClient::new();
    client.set_behaviour("http://localhost:9004", Behaviour::AcceptAsync);

    let finisher = {
        let client = client.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            client.finish("http://localhost:9004", ResultStatus::Completed, "diagram");
        })
    };

    let session = Session::new(supervisor.clone(), client.clone(), roster())
        .with_poller(Poller::new(Duration::from_secs(2), Duration::from_secs(60)));
    let report = within(Duration::from_secs(120), session.run(plan())).await?;
    finisher.await?;

    assert_eq!(report.outcome, WaitOutcome::Completed);
    let design = &report.summary.tasks[0];
    assert_eq!(design.status, TaskStatus::Completed);
    assert_eq!(design.result.as_deref(), Some("diagram"));
    assert_eq!(supervisor.terminated(), ["architect", "developer"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn timeout_still_stops_the_workers() -> TestResult {
    init_tracing();
    let supervisor = FakeSupervisor::new();
    let client = FakeWorkerClient::new();
    client.set_behaviour("http://localhost:9004", Behaviour::AcceptAsync);

    let report = Session::new(supervisor.clone(), client.clone(), roster())
        .with_poller(Poller::new(Duration::from_secs(1), Duration::from_secs(5)))
        .run(plan())
        .await?;

    assert_eq!(report.outcome, WaitOutcome::TimedOut);
    assert_eq!(report.summary.in_progress, 1);
    assert_eq!(report.summary.not_started, 1);
    assert_eq!(supervisor.terminated(), ["architect", "developer"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn readiness_failure_cleans_up_and_submits_nothing() -> TestResult {
    init_tracing();
    let supervisor = FakeSupervisor::new().never_ready("developer");
    let client = FakeWorkerClient::new();
    let workers = vec![
        worker("architect", AgentRole::SystemArchitecture, 9004),
        worker("developer", AgentRole::CodeImplementation, 9001),
        worker("qa", AgentRole::QualityAssurance, 9002),
    ];

    let err = Session::new(supervisor.clone(), client.clone(), workers)
        .with_readiness_timeout(Duration::from_secs(3))
        .run(plan())
        .await
        .unwrap_err();

    assert!(matches!(err, CollabError::Timeout { .. }));
    assert!(client.submissions().is_empty());
    // `qa` was never spawned; both spawned workers are stopped.
    assert_eq!(supervisor.terminated(), ["architect", "developer"]);
    assert!(
        !supervisor
            .events()
            .contains(&SupervisorEvent::Spawned("qa".into()))
    );
    Ok(())
}

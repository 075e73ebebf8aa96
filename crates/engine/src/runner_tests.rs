// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::monitoring::MonitoringRegistry;
use crate::bus::EventBus;
use codemachine_adapters::{ChainedPromptResult, EngineRegistry, ExecResult, FakeEngine};
use codemachine_core::{FakeClock, MonitoringId, SessionId};
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tokio::sync::mpsc;

const ONE_STEP_TEMPLATE: &str = r#"
[[step]]
kind = "module"
agent_id = "a"
agent_name = "Agent A"
prompt_path = "prompts/a.md"
"#;

const TWO_STEP_TEMPLATE: &str = r#"
[[step]]
kind = "module"
agent_id = "a"
agent_name = "Agent A"
prompt_path = "prompts/a.md"

[[step]]
kind = "module"
agent_id = "b"
agent_name = "Agent B"
prompt_path = "prompts/b.md"
"#;

fn write_file(dir: &Path, relative: &str, content: &str) {
    let full = dir.join(relative);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn fresh_registry() -> Arc<MonitoringRegistry> {
    Arc::new(MonitoringRegistry::new(Arc::new(FakeClock::new(1_000))))
}

fn options(dir: &TempDir, engines: Arc<EngineRegistry>, input: mpsc::Receiver<UserSignal>, with_template: bool) -> RunOptions {
    RunOptions {
        cwd: Some(dir.path().to_str().unwrap().to_string()),
        template_path: with_template.then(|| dir.path().join("template.toml").to_str().unwrap().to_string()),
        specification_path: None,
        track: None,
        conditions: vec![],
        autonomous: false,
        controller_agent: None,
        controller_during_sub_agents: SubAgentPolicy::Suspend,
        engines,
        clock: Arc::new(FakeClock::new(1_000)),
        input,
        events: Arc::new(EventBus::new()),
    }
}

#[tokio::test]
async fn linear_two_step_workflow_completes() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", TWO_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");
    write_file(dir.path(), "prompts/b.md", "do b");

    let engines = Arc::new(EngineRegistry::new());
    engines.register(Arc::new(FakeEngine::new("fake")));

    let (tx, rx) = mpsc::channel(8);
    tx.send(UserSignal::Prompt { value: None }).await.unwrap();
    tx.send(UserSignal::Prompt { value: None }).await.unwrap();

    let outcome = run_with_registry(options(&dir, engines, rx, true), fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
    assert_eq!(outcome.exit_code, 0);
}

#[tokio::test]
async fn a_skip_signal_advances_past_the_current_step() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let engines = Arc::new(EngineRegistry::new());
    engines.register(Arc::new(FakeEngine::new("fake")));

    let (tx, rx) = mpsc::channel(8);
    tx.send(UserSignal::Skip).await.unwrap();

    let outcome = run_with_registry(options(&dir, engines, rx, true), fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
}

#[tokio::test]
async fn a_stop_signal_halts_the_workflow() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let engines = Arc::new(EngineRegistry::new());
    engines.register(Arc::new(FakeEngine::new("fake")));

    let (tx, rx) = mpsc::channel(8);
    drop(tx);

    let outcome = run_with_registry(options(&dir, engines, rx, true), fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Stopped);
    assert_eq!(outcome.exit_code, 1);
}

#[tokio::test]
async fn chained_prompts_replay_before_real_input_is_consulted() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = FakeEngine::new("fake").with_resume_support();
    fake.set_execute_result(Ok(ExecResult {
        output: "first".to_string(),
        session_id: Some(SessionId::new("s1")),
        chained_prompts: vec![ChainedPromptResult {
            name: "follow".to_string(),
            label: "Follow-up".to_string(),
            content: "second turn".to_string(),
        }],
        monitoring_id: MonitoringId(1),
    }));
    fake.set_resume_result(Ok(ExecResult {
        output: "second".to_string(),
        session_id: Some(SessionId::new("s1")),
        chained_prompts: vec![],
        monitoring_id: MonitoringId(1),
    }));

    let engines = Arc::new(EngineRegistry::new());
    engines.register(Arc::new(fake.clone()));

    let (tx, rx) = mpsc::channel(8);
    tx.send(UserSignal::Prompt { value: None }).await.unwrap();

    let outcome = run_with_registry(options(&dir, engines, rx, true), fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
    assert_eq!(fake.calls().len(), 2, "expected one execute and one resume for the chained turn");
}

#[tokio::test]
async fn a_pause_signal_interrupts_a_running_step() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = Arc::new(FakeEngine::new("fake"));
    fake.set_execute_result(Ok(ExecResult {
        output: String::new(),
        session_id: Some(SessionId::new("resumable-session")),
        chained_prompts: vec![],
        monitoring_id: MonitoringId(1),
    }));
    let gate = fake.pause_next_execute();
    let engines = Arc::new(EngineRegistry::new());
    engines.register(fake.clone());

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(run_with_registry(options(&dir, engines.clone(), rx, true), fresh_registry()));

    while fake.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    tx.send(UserSignal::Pause).await.unwrap();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();
    drop(tx);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Stopped);
    assert_eq!(fake.calls().len(), 1, "a paused step must not be re-invoked before the run ends");

    let record = StepRecord::load(&StorageRoot::new(dir.path()), 0).unwrap().unwrap();
    assert!(record.completed_at.is_none(), "a paused step must not be marked complete");
    assert!(record.is_resumable(), "a step interrupted by pause must carry the session id needed to resume it");
}

#[tokio::test]
async fn a_skip_signal_interrupts_a_running_step() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = Arc::new(FakeEngine::new("fake"));
    let gate = fake.pause_next_execute();
    let engines = Arc::new(EngineRegistry::new());
    engines.register(fake.clone());

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(run_with_registry(options(&dir, engines.clone(), rx, true), fresh_registry()));

    while fake.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    tx.send(UserSignal::Skip).await.unwrap();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();
    drop(tx);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
    assert_eq!(fake.calls().len(), 1, "a skipped step must not be re-invoked");
}

#[tokio::test]
async fn resume_after_restart_resumes_a_step_paused_mid_execution() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = Arc::new(FakeEngine::new("fake"));
    fake.set_execute_result(Ok(ExecResult {
        output: String::new(),
        session_id: Some(SessionId::new("resumable-session")),
        chained_prompts: vec![],
        monitoring_id: MonitoringId(1),
    }));
    let gate = fake.pause_next_execute();
    let engines = Arc::new(EngineRegistry::new());
    engines.register(fake.clone());

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(run_with_registry(options(&dir, engines.clone(), rx, true), fresh_registry()));
    while fake.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    tx.send(UserSignal::Pause).await.unwrap();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();
    drop(tx);
    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Stopped);
    assert_eq!(fake.calls().len(), 1);

    let (_tx2, rx2) = mpsc::channel(8);
    let outcome2 = run_with_registry(options(&dir, engines, rx2, false), fresh_registry()).await.unwrap();
    assert_eq!(outcome2.final_state, WorkflowState::Stopped, "a restarted paused step lands back in awaiting, not completed");
    assert_eq!(fake.calls().len(), 1, "a resumed-but-not-yet-reprompted step must not re-invoke the engine");
}

#[tokio::test]
async fn controller_autonomous_mode_persists_across_restarts() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = Arc::new(FakeEngine::new("fake"));
    let engines = Arc::new(EngineRegistry::new());
    engines.register(fake.clone());

    let (tx, rx) = mpsc::channel(8);
    drop(tx);
    let mut run1 = options(&dir, engines.clone(), rx, true);
    run1.autonomous = true;
    run1.controller_agent = Some("a".to_string());
    let outcome = run_with_registry(run1, fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
    assert_eq!(fake.calls().len(), 2, "expected the step's own execute plus one controller turn");

    let persisted = ControllerState::load(&StorageRoot::new(dir.path())).unwrap();
    assert!(persisted.autonomous_mode, "autonomous mode must survive to controller.json");

    // A process restarted without re-passing `--autonomous` must still pick
    // up the persisted mode and seed the controller provider from it.
    let (_tx2, rx2) = mpsc::channel(8);
    let mut run2 = options(&dir, engines, rx2, false);
    run2.controller_agent = Some("a".to_string());
    let runner2 = Runner::bootstrap(run2, fresh_registry()).unwrap();
    assert!(runner2.using_controller, "a restarted process must resume autonomous mode from controller.json");
}

#[tokio::test]
async fn resume_after_restart_skips_already_completed_steps() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "template.toml", ONE_STEP_TEMPLATE);
    write_file(dir.path(), "prompts/a.md", "do a");

    let fake = Arc::new(FakeEngine::new("fake"));
    let engines = Arc::new(EngineRegistry::new());
    engines.register(fake.clone());

    let (tx, rx) = mpsc::channel(8);
    tx.send(UserSignal::Prompt { value: None }).await.unwrap();
    let outcome = run_with_registry(options(&dir, engines.clone(), rx, true), fresh_registry()).await.unwrap();
    assert_eq!(outcome.final_state, WorkflowState::Completed);
    assert_eq!(fake.calls().len(), 1);

    let (_tx2, rx2) = mpsc::channel(8);
    let outcome2 = run_with_registry(options(&dir, engines, rx2, false), fresh_registry()).await.unwrap();
    assert_eq!(outcome2.final_state, WorkflowState::Completed);
    assert_eq!(fake.calls().len(), 1, "a resumed run must not re-invoke an already-completed step");
}

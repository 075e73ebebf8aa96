// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::engine::{ExecCtx, PromptInput};
use codemachine_core::AbortSignal;
use std::sync::Arc;
use tokio::sync::mpsc;

fn ctx(monitoring_id: MonitoringId) -> ExecCtx {
    let (log_tx, _log_rx) = mpsc::channel(1);
    let (telemetry_tx, _telemetry_rx) = mpsc::channel(1);
    ExecCtx {
        cwd: "/tmp".to_string(),
        prompt: PromptInput::Prompt("hello".to_string()),
        model: None,
        reasoning_effort: None,
        abort_signal: AbortSignal::new(),
        monitoring_id,
        log_sink: log_tx,
        telemetry_sink: telemetry_tx,
        resume_session_id: None,
        resume_prompt: None,
    }
}

#[tokio::test]
async fn execute_records_call_and_returns_default_success() {
    let engine = FakeEngine::new("fake");
    let result = engine.execute(ctx(MonitoringId(1))).await.unwrap();
    assert_eq!(result.output, "");
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Execute {
            monitoring_id: MonitoringId(1)
        }]
    );
}

#[tokio::test]
async fn resume_without_support_flag_errors() {
    let engine = FakeEngine::new("fake");
    let err = engine.resume(ctx(MonitoringId(1))).await.unwrap_err();
    assert!(matches!(err, EngineError::ResumeUnsupported { .. }));
}

#[tokio::test]
async fn resume_with_support_flag_succeeds() {
    let engine = FakeEngine::new("fake").with_resume_support();
    let result = engine.resume(ctx(MonitoringId(2))).await.unwrap();
    assert_eq!(result.monitoring_id, MonitoringId(2));
}

#[tokio::test]
async fn pause_next_execute_blocks_until_notified() {
    let engine = Arc::new(FakeEngine::new("fake"));
    let gate = engine.pause_next_execute();

    let waiting = engine.clone();
    let handle = tokio::spawn(async move { waiting.execute(ctx(MonitoringId(1))).await });

    while engine.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(!handle.is_finished(), "execute must stay pending until the gate is notified");

    gate.notify_one();
    let result = handle.await.unwrap().unwrap();
    assert_eq!(result.monitoring_id, MonitoringId(1));
}

#[tokio::test]
async fn scripted_execute_result_is_returned_once() {
    let engine = FakeEngine::new("fake");
    engine.set_execute_result(Ok(ExecResult {
        output: "scripted".to_string(),
        session_id: None,
        chained_prompts: vec![],
        monitoring_id: MonitoringId(1),
    }));

    let first = engine.execute(ctx(MonitoringId(1))).await.unwrap();
    assert_eq!(first.output, "scripted");

    let second = engine.execute(ctx(MonitoringId(1))).await.unwrap();
    assert_eq!(second.output, "");
}

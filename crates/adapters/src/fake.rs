// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scriptable [`Engine`] for deterministic tests.

use crate::engine::{AgentConfig, EngineError, EngineMetadata, ExecCtx, ExecResult};
use crate::Engine;
use async_trait::async_trait;
use codemachine_core::MonitoringId;
use parking_lot::Mutex;
use std::sync::Arc;

/// One call recorded by [`FakeEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Execute { monitoring_id: MonitoringId },
    Resume { monitoring_id: MonitoringId },
    SyncConfig { agent_count: usize },
}

struct FakeState {
    calls: Vec<EngineCall>,
    execute_result: Option<Result<ExecResult, EngineError>>,
    resume_result: Option<Result<ExecResult, EngineError>>,
    execute_gate: Option<Arc<tokio::sync::Notify>>,
}

#[derive(Clone)]
pub struct FakeEngine {
    id: String,
    supports_resume: bool,
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supports_resume: false,
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                execute_result: None,
                resume_result: None,
                execute_gate: None,
            })),
        }
    }

    /// Makes the next `execute` call hang until the returned [`Notify`] is
    /// notified, so a test can deterministically win a race against it
    /// (e.g. sending a pause signal before releasing the gate).
    ///
    /// [`Notify`]: tokio::sync::Notify
    pub fn pause_next_execute(&self) -> Arc<tokio::sync::Notify> {
        let notify = Arc::new(tokio::sync::Notify::new());
        self.state.lock().execute_gate = Some(notify.clone());
        notify
    }

    pub fn with_resume_support(mut self) -> Self {
        self.supports_resume = true;
        self
    }

    pub fn set_execute_result(&self, result: Result<ExecResult, EngineError>) {
        self.state.lock().execute_result = Some(result);
    }

    pub fn set_resume_result(&self, result: Result<ExecResult, EngineError>) {
        self.state.lock().resume_result = Some(result);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl Engine for FakeEngine {
    fn metadata(&self) -> EngineMetadata {
        EngineMetadata {
            id: self.id.clone(),
            default_model: None,
        }
    }

    fn supports_resume(&self) -> bool {
        self.supports_resume
    }

    async fn sync_config(&self, configs: &[AgentConfig]) -> Result<(), EngineError> {
        self.state.lock().calls.push(EngineCall::SyncConfig {
            agent_count: configs.len(),
        });
        Ok(())
    }

    async fn execute(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError> {
        self.state.lock().calls.push(EngineCall::Execute {
            monitoring_id: ctx.monitoring_id,
        });
        let gate = self.state.lock().execute_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock();
        state.execute_result.take().unwrap_or_else(|| {
            Ok(ExecResult {
                output: String::new(),
                session_id: None,
                chained_prompts: vec![],
                monitoring_id: ctx.monitoring_id,
            })
        })
    }

    async fn resume(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError> {
        self.state.lock().calls.push(EngineCall::Resume {
            monitoring_id: ctx.monitoring_id,
        });
        if !self.supports_resume {
            return Err(EngineError::ResumeUnsupported {
                engine_id: self.id.clone(),
            });
        }
        let mut state = self.state.lock();
        state.resume_result.take().unwrap_or_else(|| {
            Ok(ExecResult {
                output: String::new(),
                session_id: None,
                chained_prompts: vec![],
                monitoring_id: ctx.monitoring_id,
            })
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

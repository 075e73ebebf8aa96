// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Engine` contract (spec §4.6, §6.2): a pluggable interface the
//! Step Executor drives to actually invoke an LLM-backed agent.

use async_trait::async_trait;
use codemachine_core::{AbortSignal, MonitoringId, RunStatus, SessionId, Telemetry};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Prompt source for one execution: either inline text or a file to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Prompt(String),
    PromptPath(String),
}

/// A telemetry snapshot streamed from an in-flight engine run, marshalled
/// through a channel onto the Monitoring Registry (spec §5: "log and
/// telemetry updates from engines are marshalled through a thread-safe
/// channel before being re-published").
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    pub monitoring_id: MonitoringId,
    pub telemetry: Telemetry,
}

/// A line appended to an agent's log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub monitoring_id: MonitoringId,
    pub text: String,
}

/// Everything an `Engine::execute`/`resume` call needs (spec §4.6
/// `ExecCtx`).
pub struct ExecCtx {
    pub cwd: String,
    pub prompt: PromptInput,
    pub model: Option<String>,
    pub reasoning_effort: Option<String>,
    pub abort_signal: AbortSignal,
    pub monitoring_id: MonitoringId,
    pub log_sink: mpsc::Sender<LogLine>,
    pub telemetry_sink: mpsc::Sender<TelemetryUpdate>,
    pub resume_session_id: Option<SessionId>,
    pub resume_prompt: Option<String>,
}

/// One additional prompt to replay into the same session (spec §3
/// "chained prompts").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedPromptResult {
    pub name: String,
    pub label: String,
    pub content: String,
}

/// Result of a successful `execute`/`resume` call (spec §4.6 `ExecResult`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub output: String,
    pub session_id: Option<SessionId>,
    pub chained_prompts: Vec<ChainedPromptResult>,
    pub monitoring_id: MonitoringId,
}

/// Agent-facing configuration passed to `sync_config` once per workflow.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent_id: String,
    pub engine_id: String,
    pub model: Option<String>,
}

/// Static facts about an engine implementation.
#[derive(Debug, Clone)]
pub struct EngineMetadata {
    pub id: String,
    pub default_model: Option<String>,
}

/// Errors other than cooperative cancellation surfaced by an engine call
/// (spec §7 `EngineError`: "a subprocess or provider returned non-zero /
/// malformed output").
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine {engine_id} failed: {reason}")]
    Failed { engine_id: String, reason: String },
    #[error("engine {engine_id} does not support resume")]
    ResumeUnsupported { engine_id: String },
    #[error(transparent)]
    Adapter(#[from] codemachine_core::AdapterError),
}

impl EngineError {
    /// A status-mapped view for the Monitoring Registry (spec §3 `status`
    /// includes `failed`; aborts are reported separately as `AdapterError::Aborted`).
    pub fn run_status(&self) -> RunStatus {
        RunStatus::Failed
    }
}

impl fmt::Debug for dyn Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Engine({})", self.metadata().id)
    }
}

/// A pluggable backend the Step Executor drives to run one agent turn
/// (spec §4.6).
#[async_trait]
pub trait Engine: Send + Sync {
    fn metadata(&self) -> EngineMetadata;

    /// Whether `resume` is implemented for this engine.
    fn supports_resume(&self) -> bool {
        false
    }

    /// Optional pre-run configuration sync, called once per workflow
    /// with the full list of agent configs.
    async fn sync_config(&self, _configs: &[AgentConfig]) -> Result<(), EngineError> {
        Ok(())
    }

    async fn execute(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError>;

    async fn resume(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError> {
        let _ = ctx;
        Err(EngineError::ResumeUnsupported {
            engine_id: self.metadata().id,
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

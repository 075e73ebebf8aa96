// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Step Executor (spec §4.7 C7): runs one [`Step`] through its
//! resolved engine, wiring the Agent Logger, the Monitoring Registry, and
//! the Event Bus, and returns its output plus any chained prompts.

use crate::error::EngineError;
use crate::monitoring::MonitoringRegistry;
use codemachine_adapters::{
    AgentLogger, EngineRegistry, ExecCtx, ExecResult, LogLine, PromptInput, TelemetryUpdate,
};
use codemachine_core::{AbortSignal, MonitoringId, RunStatus, SessionId};
use codemachine_runbook::Step;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::bus::Emitter;

/// Per-call wiring the Runner assembles for one [`StepExecutor::execute`]
/// invocation (spec §4.7 "a wiring struct").
pub struct ExecWiring {
    pub logger: Arc<AgentLogger>,
    pub emitter: Emitter,
    pub abort_signal: AbortSignal,
    pub unique_agent_id: String,
    pub resume_monitoring_id: Option<MonitoringId>,
    pub resume_session_id: Option<SessionId>,
    pub resume_prompt: Option<String>,
}

/// Runs a [`Step`] against the engine registry, streaming output and
/// telemetry through the Agent Logger, Monitoring Registry, and Event Bus.
pub struct StepExecutor {
    monitoring: Arc<MonitoringRegistry>,
    engines: Arc<EngineRegistry>,
}

impl StepExecutor {
    pub fn new(monitoring: Arc<MonitoringRegistry>, engines: Arc<EngineRegistry>) -> Self {
        Self { monitoring, engines }
    }

    /// Execute (or resume) `step`, honoring spec §4.7's four guarantees:
    /// engine fallback, register-or-attach, output/telemetry streaming,
    /// and cooperative abort.
    pub async fn execute(
        &self,
        step: &Step,
        cwd: &str,
        log_path: impl AsRef<Path>,
        wiring: ExecWiring,
    ) -> Result<ExecResult, EngineError> {
        let (engine, fell_back) = self
            .engines
            .resolve(step.engine_id.as_deref())
            .map_err(|e| EngineError::validation(e.to_string()))?;
        if fell_back {
            wiring.emitter.message_log(format!(
                "unknown engine id {:?} for agent {}; falling back to default",
                step.engine_id, step.agent_id
            ));
        }

        let monitoring_id = match wiring.resume_monitoring_id {
            Some(id) => id,
            None => {
                let id = self.monitoring.register(
                    step.agent_name.clone(),
                    engine.metadata().id,
                    None,
                    log_path.as_ref().display().to_string(),
                );
                wiring.emitter.agent_added(id, None, step.agent_name.clone(), engine.metadata().id);
                wiring.emitter.monitoring_register(id, step.agent_name.clone(), engine.metadata().id, None);
                id
            }
        };
        self.monitoring.set_log_path(monitoring_id, log_path.as_ref().display().to_string());
        wiring
            .logger
            .open(monitoring_id, log_path.as_ref())
            .map_err(|e| EngineError::validation(e.to_string()))?;

        self.monitoring.mark_status(monitoring_id, RunStatus::Running);
        wiring.emitter.agent_status(monitoring_id, RunStatus::Running);
        if let Some(model) = &step.model {
            self.monitoring.set_model(monitoring_id, model.clone());
            wiring.emitter.agent_model(monitoring_id, model.clone());
        }

        let prompt = self.load_prompt(step, cwd)?;

        let (log_tx, mut log_rx) = mpsc::channel::<LogLine>(64);
        let (telemetry_tx, mut telemetry_rx) = mpsc::channel::<TelemetryUpdate>(64);

        let logger = wiring.logger.clone();
        let log_task = tokio::spawn(async move {
            while let Some(line) = log_rx.recv().await {
                let _ = logger.write(line.monitoring_id, &line.text);
            }
        });

        let monitoring = self.monitoring.clone();
        let telemetry_emitter = wiring.emitter.clone();
        let telemetry_task = tokio::spawn(async move {
            while let Some(update) = telemetry_rx.recv().await {
                monitoring.update_telemetry(update.monitoring_id, update.telemetry);
                telemetry_emitter.agent_telemetry(update.monitoring_id, update.telemetry);
            }
        });

        let ctx = ExecCtx {
            cwd: cwd.to_string(),
            prompt: PromptInput::Prompt(prompt),
            model: step.model.clone(),
            reasoning_effort: step.model_reasoning_effort.map(|e| format!("{e:?}").to_lowercase()),
            abort_signal: wiring.abort_signal.clone(),
            monitoring_id,
            log_sink: log_tx,
            telemetry_sink: telemetry_tx,
            resume_session_id: wiring.resume_session_id.clone(),
            resume_prompt: wiring.resume_prompt.clone(),
        };

        let result = if wiring.resume_monitoring_id.is_some() {
            engine.resume(ctx).await
        } else {
            engine.execute(ctx).await
        };

        let _ = log_task.await;
        let _ = telemetry_task.await;

        match result {
            Ok(exec_result) => {
                if let Some(session_id) = &exec_result.session_id {
                    self.monitoring.set_session(monitoring_id, session_id.clone());
                }
                if wiring.abort_signal.is_aborted() {
                    return Err(EngineError::Abort {
                        monitoring_id: Some(monitoring_id),
                        session_id: exec_result.session_id.clone(),
                    });
                }
                self.monitoring.mark_status(monitoring_id, RunStatus::Completed);
                wiring.emitter.agent_status(monitoring_id, RunStatus::Completed);
                Ok(exec_result)
            }
            Err(err) => {
                if wiring.abort_signal.is_aborted() {
                    return Err(EngineError::Abort {
                        monitoring_id: Some(monitoring_id),
                        session_id: self.monitoring.session_id(monitoring_id),
                    });
                }
                self.monitoring.mark_status(monitoring_id, RunStatus::Failed);
                wiring.emitter.agent_status(monitoring_id, RunStatus::Failed);
                Err(EngineError::from(err))
            }
        }
    }

    /// Concatenate a step's prompt file(s) with a blank-line separator
    /// (spec §4.7 edge case); a missing file is a distinct error kind so
    /// the state machine can surface `STEP_ERROR`.
    fn load_prompt(&self, step: &Step, cwd: &str) -> Result<String, EngineError> {
        let prompt_path = step
            .prompt_path
            .as_ref()
            .ok_or_else(|| EngineError::validation(format!("step {} has no prompt_path", step.agent_id)))?;

        let mut parts = Vec::new();
        for relative in prompt_path.paths() {
            let full_path = Path::new(cwd).join(relative);
            let content = std::fs::read_to_string(&full_path).map_err(|_| {
                EngineError::validation(format!("prompt file not found: {}", full_path.display()))
            })?;
            parts.push(content);
        }
        Ok(parts.join("\n\n"))
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

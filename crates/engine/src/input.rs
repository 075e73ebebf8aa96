// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input Providers (spec §4.8 C8): two interchangeable sources of
//! post-step input, user and controller, both honoring the same
//! [`InputResult`] contract. Per spec §9 REDESIGN FLAGS "two providers,
//! one contract", provider switching is a dedicated [`InputResult`]
//! variant rather than the source's `__SWITCH_TO_AUTO__` /
//! `__SWITCH_TO_MANUAL__` string sentinels.

use crate::bus::Emitter;
use crate::error::EngineError;
use crate::executor::{ExecWiring, StepExecutor};
use async_trait::async_trait;
use codemachine_adapters::AgentLogger;
use codemachine_core::{AbortSignal, InputSource, MonitoringId, SessionId};
use codemachine_runbook::{ChainedPrompt, Step};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Which provider the Runner should switch to next (spec §9 "a dedicated
/// `ProviderSwitch` variant of `InputResult`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Manual,
    Auto,
}

/// Everything an `InputProvider` needs to decide the next input (spec
/// §4.8 `InputContext`).
#[derive(Debug, Clone)]
pub struct InputContext {
    pub step_output: String,
    pub step_index: usize,
    pub total_steps: usize,
    pub prompt_queue: Vec<ChainedPrompt>,
    pub prompt_queue_index: usize,
    pub cwd: String,
}

/// The outcome of one `getInput` call (spec §4.8 `InputResult`).
#[derive(Debug, Clone, PartialEq)]
pub enum InputResult {
    Input {
        value: String,
        resume_monitoring_id: Option<MonitoringId>,
        source: InputSource,
    },
    Skip,
    Stop,
    ProviderSwitch {
        to: ProviderKind,
    },
}

/// Common contract for both input sources (spec §4.8).
#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn get_input(&self, ctx: &InputContext) -> InputResult;

    async fn activate(&self) {}

    async fn deactivate(&self) {}
}

/// A signal delivered to [`UserInputProvider`] from the host's
/// `workflow:input` / `workflow:mode-change` process signals (spec §6.3).
#[derive(Debug, Clone)]
pub enum UserSignal {
    Prompt { value: Option<String> },
    Skip,
    Pause,
    ModeChange { autonomous: bool },
}

/// Blocks on a `workflow:input` callback delivering `{prompt?, skip?}`
/// (spec §4.8 "UserInputProvider").
pub struct UserInputProvider {
    emitter: Emitter,
    signals: Arc<Mutex<mpsc::Receiver<UserSignal>>>,
}

impl UserInputProvider {
    pub fn new(emitter: Emitter, signals: mpsc::Receiver<UserSignal>) -> Self {
        Self {
            emitter,
            signals: Arc::new(Mutex::new(signals)),
        }
    }

    /// A shared handle to the signal channel, for the Runner to race
    /// against a step's execution while it is running (spec §5
    /// "cancelled on pause/skip/stop/mode-switch").
    pub(crate) fn signals(&self) -> Arc<Mutex<mpsc::Receiver<UserSignal>>> {
        self.signals.clone()
    }
}

#[async_trait]
impl InputProvider for UserInputProvider {
    async fn get_input(&self, _ctx: &InputContext) -> InputResult {
        self.emitter.input_state(true, InputSource::User);
        let mut signals = self.signals.lock().await;
        loop {
            return match signals.recv().await {
                None => InputResult::Stop,
                Some(UserSignal::Skip) => InputResult::Skip,
                // Pause only has meaning while a step is executing; while
                // awaiting input it is a no-op.
                Some(UserSignal::Pause) => continue,
                Some(UserSignal::ModeChange { autonomous: true }) => {
                    InputResult::ProviderSwitch { to: ProviderKind::Auto }
                }
                Some(UserSignal::ModeChange { autonomous: false }) => {
                    InputResult::ProviderSwitch { to: ProviderKind::Manual }
                }
                Some(UserSignal::Prompt { value }) => InputResult::Input {
                    value: value.unwrap_or_default(),
                    resume_monitoring_id: None,
                    source: InputSource::User,
                },
            };
        }
    }

    async fn deactivate(&self) {
        self.emitter.input_state(false, InputSource::User);
    }
}

struct ControllerState {
    monitoring_id: Option<MonitoringId>,
    session_id: Option<SessionId>,
}

/// Invokes the configured controller `Engine` with the last step's output
/// as context, streaming through the Monitoring Registry and Agent Logger
/// like any agent (spec §4.8 "ControllerInputProvider").
pub struct ControllerInputProvider {
    executor: Arc<StepExecutor>,
    controller_step: Step,
    cwd: String,
    log_path: PathBuf,
    emitter: Emitter,
    logger: Arc<AgentLogger>,
    abort_signal: AbortSignal,
    cancel_to_manual: AtomicBool,
    state: Mutex<ControllerState>,
}

impl ControllerInputProvider {
    pub fn new(
        executor: Arc<StepExecutor>,
        controller_step: Step,
        cwd: impl Into<String>,
        log_path: PathBuf,
        emitter: Emitter,
        logger: Arc<AgentLogger>,
        abort_signal: AbortSignal,
    ) -> Self {
        Self::resuming(executor, controller_step, cwd, log_path, emitter, logger, abort_signal, None, None)
    }

    /// As [`Self::new`], but seeded from a persisted `controller.json`
    /// record so a restarted process resumes the controller's own session
    /// rather than starting a fresh one (spec §6.4 `controllerConfig`).
    #[allow(clippy::too_many_arguments)]
    pub fn resuming(
        executor: Arc<StepExecutor>,
        controller_step: Step,
        cwd: impl Into<String>,
        log_path: PathBuf,
        emitter: Emitter,
        logger: Arc<AgentLogger>,
        abort_signal: AbortSignal,
        resume_monitoring_id: Option<MonitoringId>,
        resume_session_id: Option<SessionId>,
    ) -> Self {
        Self {
            executor,
            controller_step,
            cwd: cwd.into(),
            log_path,
            emitter,
            logger,
            abort_signal,
            cancel_to_manual: AtomicBool::new(false),
            state: Mutex::new(ControllerState {
                monitoring_id: resume_monitoring_id,
                session_id: resume_session_id,
            }),
        }
    }

    /// Called when the user types while the controller is running; toggles
    /// the next `get_input` call back to manual (spec §4.8 "a cancellation
    /// toggles back to manual").
    pub fn request_cancel_to_manual(&self) {
        self.cancel_to_manual.store(true, Ordering::SeqCst);
        self.abort_signal.abort();
    }

    /// The controller's own agent id, for persisting `controllerConfig`.
    pub(crate) fn agent_id(&self) -> &str {
        &self.controller_step.agent_id
    }

    /// The controller's current monitoring/session ids, for persisting
    /// `controllerConfig` (spec §6.4).
    pub(crate) async fn snapshot(&self) -> (Option<MonitoringId>, Option<SessionId>) {
        let state = self.state.lock().await;
        (state.monitoring_id, state.session_id.clone())
    }
}

#[async_trait]
impl InputProvider for ControllerInputProvider {
    async fn get_input(&self, ctx: &InputContext) -> InputResult {
        let mut state = self.state.lock().await;

        let wiring = ExecWiring {
            logger: self.logger.clone(),
            emitter: self.emitter.clone(),
            abort_signal: self.abort_signal.clone(),
            unique_agent_id: self.controller_step.agent_id.clone(),
            resume_monitoring_id: state.monitoring_id,
            resume_session_id: state.session_id.clone(),
            resume_prompt: Some(ctx.step_output.clone()),
        };

        match self
            .executor
            .execute(&self.controller_step, &self.cwd, &self.log_path, wiring)
            .await
        {
            Ok(result) => {
                state.monitoring_id = Some(result.monitoring_id);
                state.session_id = result.session_id.clone();
                InputResult::Input {
                    value: result.output.trim().to_string(),
                    resume_monitoring_id: state.monitoring_id,
                    source: InputSource::Controller,
                }
            }
            Err(EngineError::Abort { .. }) => {
                if self.cancel_to_manual.swap(false, Ordering::SeqCst) {
                    InputResult::ProviderSwitch { to: ProviderKind::Manual }
                } else {
                    InputResult::Stop
                }
            }
            Err(_) => InputResult::Stop,
        }
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;

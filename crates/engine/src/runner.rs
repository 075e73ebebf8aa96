// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runner / Orchestrator (spec §4.11 C11): hosts the Workflow State
//! Machine, pumps `running` and `awaiting`, owns the active input
//! provider, and wires persistence, loop/trigger/checkpoint behavior, and
//! mode switching.

use crate::behavior::{evaluate_post, evaluate_skip_pre, ActiveLoop, BehaviorOutcome};
use crate::bus::{Emitter, EventBus};
use crate::error::EngineError;
use crate::executor::{ExecWiring, StepExecutor};
use crate::input::{
    ControllerInputProvider, InputContext, InputProvider, InputResult, ProviderKind,
    UserInputProvider, UserSignal,
};
use crate::monitoring::MonitoringRegistry;
use crate::state_machine::{StateMachine, StepOutput, WorkflowState};
use codemachine_adapters::{AgentLogger, EngineRegistry, ExecResult};
use codemachine_core::{AbortSignal, Clock, MonitoringId};
use codemachine_runbook::{apply_filters, parse_template_with_format, ChainedPrompt, Format, Step, StepKind};
use codemachine_storage::{
    read_directive, reset_directive, write_directive, ControllerConfig, ControllerState, StepRecord, StorageRoot,
    TemplateState,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Whether an autonomous controller keeps steering a step that itself
/// spawns sub-agents, or yields to them (spec §9 Open Question, resolved
/// here as a policy knob defaulting to `Suspend`). Recorded on every run;
/// a step's own concurrent sub-agents are not yet surfaced by any engine
/// implementation, so this does not yet change behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAgentPolicy {
    Run,
    Suspend,
}

impl Default for SubAgentPolicy {
    fn default() -> Self {
        Self::Suspend
    }
}

/// Why a running step's `abortSignal` was tripped (spec §5 "cancelled on
/// pause/skip/stop/mode-switch").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepAbortReason {
    Paused,
    Skipped,
    Stopped,
}

/// The result of racing a step's execution against incoming user signals.
enum StepRunOutcome {
    Interrupted {
        reason: StepAbortReason,
        monitoring_id: Option<MonitoringId>,
        session_id: Option<codemachine_core::SessionId>,
    },
    Failed(EngineError),
}

/// Awaits the next signal, or never resolves once the channel has closed
/// (so a closed channel doesn't spin the `select!` loop).
async fn next_or_pending(rx: &mut mpsc::Receiver<UserSignal>, closed: bool) -> Option<UserSignal> {
    if closed {
        std::future::pending().await
    } else {
        rx.recv().await
    }
}

/// Inputs to the single public entry point (spec §6.5 `run(options)`).
pub struct RunOptions {
    pub cwd: Option<String>,
    pub template_path: Option<String>,
    pub specification_path: Option<String>,
    pub track: Option<String>,
    pub conditions: Vec<String>,
    pub autonomous: bool,
    pub controller_agent: Option<String>,
    pub controller_during_sub_agents: SubAgentPolicy,
    pub engines: Arc<EngineRegistry>,
    pub clock: Arc<dyn Clock>,
    /// The process's `workflow:input`/`workflow:mode-change` signals,
    /// wired as an explicit channel in place of OS-process events (spec
    /// §9 "Cross-module state via process-wide signals → explicit
    /// channels").
    pub input: mpsc::Receiver<UserSignal>,
    /// Externally owned so a UI adapter can subscribe before the run
    /// starts (spec §6.1); the Runner only ever publishes to it.
    pub events: Arc<EventBus>,
}

/// The terminal result of a run (spec §6.5: "exit code is 0 on completed,
/// non-zero on error").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub final_state: WorkflowState,
    pub exit_code: i32,
}

impl RunOutcome {
    fn from_state(final_state: WorkflowState) -> Self {
        let exit_code = if final_state == WorkflowState::Completed { 0 } else { 1 };
        Self { final_state, exit_code }
    }
}

/// The single public entry point the CLI calls (spec §6.5).
pub async fn run(options: RunOptions) -> Result<RunOutcome, EngineError> {
    run_with_registry(options, MonitoringRegistry::shared()).await
}

/// As [`run`], but with an explicit Monitoring Registry so tests don't
/// share the process-wide singleton.
pub async fn run_with_registry(
    options: RunOptions,
    monitoring: Arc<MonitoringRegistry>,
) -> Result<RunOutcome, EngineError> {
    let mut runner = Runner::bootstrap(options, monitoring)?;
    runner.drive().await
}

struct Runner {
    root: StorageRoot,
    cwd: String,
    steps: Vec<Step>,
    sm: StateMachine,
    clock: Arc<dyn Clock>,
    executor: Arc<StepExecutor>,
    logger: Arc<AgentLogger>,
    emitter: Emitter,
    abort_signal: AbortSignal,
    active_loop: Option<ActiveLoop>,
    completed_steps: HashSet<usize>,
    controller_during_sub_agents: SubAgentPolicy,
    user_provider: UserInputProvider,
    controller_provider: Option<ControllerInputProvider>,
    using_controller: bool,
    awaiting_checkpoint: bool,
    pending_resume_prompt: Option<String>,
    signals: Arc<Mutex<mpsc::Receiver<UserSignal>>>,
    controller_state: ControllerState,
}

impl Runner {
    fn bootstrap(options: RunOptions, monitoring: Arc<MonitoringRegistry>) -> Result<Self, EngineError> {
        let cwd = options.cwd.unwrap_or_else(|| ".".to_string());
        let root = StorageRoot::new(&cwd);

        let template_state = match options.template_path {
            Some(path) => {
                let state = TemplateState {
                    template_path: path,
                    selected_track: options.track,
                    selected_conditions: options.conditions,
                    project_name: None,
                };
                state.save(&root)?;
                state
            }
            None => TemplateState::load(&root)?,
        };

        if template_state.template_path.is_empty() {
            return Err(EngineError::validation("no template selected"));
        }

        let content = std::fs::read_to_string(&template_state.template_path)
            .map_err(|e| EngineError::validation(format!("cannot read template: {e}")))?;
        let format = if template_state.template_path.ends_with(".hcl") {
            Format::Hcl
        } else {
            Format::Toml
        };
        let template = parse_template_with_format(&content, format)?;

        if template.specification {
            let spec_path = options
                .specification_path
                .unwrap_or_else(|| root.specification_path().display().to_string());
            if !Path::new(&spec_path).exists() {
                return Err(EngineError::validation("missing specification file"));
            }
        }

        let selected_conditions: HashSet<String> = template_state.selected_conditions.iter().cloned().collect();
        let steps = apply_filters(&template.steps, template_state.selected_track.as_deref(), &selected_conditions);
        if steps.is_empty() {
            return Err(EngineError::validation("template selection produced no runnable steps"));
        }

        let emitter = Emitter::new(options.events);
        let executor = Arc::new(StepExecutor::new(monitoring, options.engines.clone()));
        let logger = Arc::new(AgentLogger::new());
        let abort_signal = AbortSignal::new();

        // Persisted controller identity (spec §6.4 `controllerConfig`), so a
        // restarted process resumes the controller's own session instead of
        // starting a fresh one.
        let mut controller_state = ControllerState::load(&root)?;

        let controller_provider = options.controller_agent.as_ref().map(|agent_id| {
            let controller_step = Step {
                kind: StepKind::Controller,
                agent_id: agent_id.clone(),
                agent_name: agent_id.clone(),
                prompt_path: steps
                    .iter()
                    .find(|s| &s.agent_id == agent_id)
                    .and_then(|s| s.prompt_path.clone()),
                engine_id: None,
                model: None,
                model_reasoning_effort: None,
                behavior: None,
                execute_once: false,
                interactive: false,
                tracks: vec![],
                conditions: vec![],
                chained_prompts: vec![],
                label: None,
            };
            let (resume_monitoring_id, resume_session_id) = controller_state
                .controller_config
                .as_ref()
                .filter(|c| &c.agent_id == agent_id)
                .map(|c| (Some(c.monitoring_id), Some(c.session_id.clone())))
                .unwrap_or((None, None));
            ControllerInputProvider::resuming(
                executor.clone(),
                controller_step,
                cwd.clone(),
                root.root().join("logs").join("controller.log"),
                emitter.clone(),
                logger.clone(),
                abort_signal.clone(),
                resume_monitoring_id,
                resume_session_id,
            )
        });

        let using_controller = options.autonomous || controller_state.autonomous_mode;
        controller_state.autonomous_mode = using_controller;
        controller_state.save(&root)?;

        let user_provider = UserInputProvider::new(emitter.clone(), options.input);
        let signals = user_provider.signals();
        let total_steps = steps.len();

        Ok(Self {
            root,
            cwd,
            steps,
            sm: StateMachine::new(total_steps),
            clock: options.clock,
            executor,
            logger,
            emitter,
            abort_signal,
            active_loop: None,
            completed_steps: HashSet::new(),
            controller_during_sub_agents: options.controller_during_sub_agents,
            user_provider,
            controller_provider,
            using_controller,
            awaiting_checkpoint: false,
            pending_resume_prompt: None,
            signals,
            controller_state,
        })
    }

    async fn drive(&mut self) -> Result<RunOutcome, EngineError> {
        self.emitter.workflow_started(self.sm.ctx().total_steps);
        self.sm.start();
        self.emitter.workflow_status("running");

        loop {
            match self.sm.state() {
                WorkflowState::Running => self.pump_running().await?,
                WorkflowState::Awaiting => self.pump_awaiting().await?,
                WorkflowState::Idle => unreachable!("start() always leaves idle"),
                terminal => {
                    self.emitter.workflow_status(format!("{terminal:?}").to_lowercase());
                    return Ok(RunOutcome::from_state(terminal));
                }
            }
        }
    }

    async fn pump_running(&mut self) -> Result<(), EngineError> {
        let index = self.sm.ctx().current_step_index;
        let step = self.steps[index].clone();

        if step.is_separator() {
            self.emitter.separator_add(index, step.label.clone().unwrap_or_default());
            self.completed_steps.insert(index);
            self.sm.step_complete(StepOutput::default());
            self.sm.input_received("");
            return Ok(());
        }

        let already_completed = self.completed_steps.contains(&index);
        if evaluate_skip_pre(&step, already_completed, self.active_loop.as_ref(), None, &HashSet::new()) {
            self.emitter.message_log(format!("skipping agent {}", step.agent_id));
            self.completed_steps.insert(index);
            self.sm.step_complete(StepOutput::default());
            self.sm.input_received("");
            return Ok(());
        }

        let existing = StepRecord::load(&self.root, index)?;
        let has_pending_resume = self.pending_resume_prompt.is_some();

        if !has_pending_resume && !already_completed {
            if let Some(record) = &existing {
                if record.completed_at.is_some() {
                    // Already ran to completion in a prior process; a
                    // restart scans forward past it (spec §8
                    // "resume-after-restart").
                    self.completed_steps.insert(index);
                    self.sm.step_complete(StepOutput {
                        output: String::new(),
                        monitoring_id: record.monitoring_id,
                    });
                    self.sm.input_received("");
                    return Ok(());
                }
                if record.is_resumable() {
                    // Paused mid-execution in a prior process: a restarted
                    // process lands back in `awaiting` with `paused=true`
                    // at the same index, exactly as a live pause would,
                    // instead of silently re-invoking the engine (spec §5
                    // "upon cancellation of a paused step, the Runner
                    // transitions to awaiting with paused=true").
                    self.sm.pause();
                    return Ok(());
                }
            }
        }

        let started_at = existing.as_ref().map(|r| r.started_at).unwrap_or_else(|| self.clock.epoch_ms());
        if existing.is_none() {
            StepRecord::started(started_at).save(&self.root, index)?;
            reset_directive(&self.root)?;
        }

        let resume_monitoring_id = existing.as_ref().and_then(|r| r.monitoring_id);
        let resume_session_id = existing.as_ref().and_then(|r| r.session_id.clone());
        let resume_prompt = self.pending_resume_prompt.take();

        let log_path = self.root.root().join("logs").join(format!("step-{index}.log"));
        let wiring = ExecWiring {
            logger: self.logger.clone(),
            emitter: self.emitter.clone(),
            abort_signal: self.abort_signal.clone(),
            unique_agent_id: format!("{}#{}", step.agent_id, index),
            resume_monitoring_id,
            resume_session_id,
            resume_prompt,
        };

        let exec_result = match self.run_step_interruptible(&step, &log_path, wiring).await {
            Ok(r) => r,
            Err(StepRunOutcome::Interrupted { reason, monitoring_id, session_id }) => {
                self.persist_interrupted_record(index, started_at, monitoring_id, session_id)?;
                match reason {
                    StepAbortReason::Paused => {
                        self.sm.pause();
                    }
                    StepAbortReason::Skipped => {
                        self.completed_steps.insert(index);
                        self.sm.step_complete(StepOutput::default());
                        self.sm.input_received("");
                    }
                    StepAbortReason::Stopped => {
                        self.sm.stop();
                    }
                }
                return Ok(());
            }
            Err(StepRunOutcome::Failed(err)) => {
                self.sm.step_error(err.to_string());
                return Err(err);
            }
        };

        let mut record = existing.unwrap_or_else(|| StepRecord::started(started_at));
        record.session_id = exec_result.session_id.clone();
        record.monitoring_id = Some(exec_result.monitoring_id);
        record.save(&self.root, index)?;

        let directive = read_directive(&self.root)?;
        match evaluate_post(&step, index, &directive, self.active_loop.as_ref()) {
            BehaviorOutcome::Checkpoint { reason } => {
                self.emitter.checkpoint_state(index, reason);
                self.awaiting_checkpoint = true;
                self.sm.pause();
            }
            BehaviorOutcome::Trigger { target_agent_id } => {
                self.run_triggered_agent(&target_agent_id).await?;
                self.finish_step(index, &exec_result)?;
            }
            BehaviorOutcome::Loop { steps_back, iteration, max_iterations } => {
                self.emitter.loop_state(index, iteration, max_iterations);
                let skip_set = match &step.behavior {
                    Some(codemachine_runbook::Behavior::Loop { skip_set, .. }) => skip_set.clone(),
                    _ => HashSet::new(),
                };
                self.active_loop = Some(ActiveLoop {
                    source_step_index: index,
                    source_agent: step.agent_id.clone(),
                    skip_set,
                    iteration,
                });
                self.mark_record_completed(index)?;
                self.completed_steps.insert(index);
                self.sm.ctx_mut().current_step_index = index.saturating_sub(steps_back);
                self.sm.step_complete(StepOutput::default());
                self.sm.input_received("");
                write_directive(&self.root, &codemachine_core::Directive::continue_())?;
            }
            BehaviorOutcome::LoopExhausted => {
                if self.active_loop.is_some() {
                    self.emitter.loop_clear(index);
                    self.active_loop = None;
                }
                self.finish_step(index, &exec_result)?;
            }
            BehaviorOutcome::Advance => {
                self.finish_step(index, &exec_result)?;
            }
        }

        Ok(())
    }

    /// Races a step's engine execution against incoming user signals
    /// (spec §5 "the Runner owns one `abortController` at a time; it is
    /// cancelled on pause/skip/stop/mode-switch"), so a long-running step
    /// can be interrupted instead of only ever being awaited to
    /// completion.
    async fn run_step_interruptible(
        &mut self,
        step: &Step,
        log_path: &Path,
        wiring: ExecWiring,
    ) -> Result<ExecResult, StepRunOutcome> {
        let executor = self.executor.clone();
        let step = step.clone();
        let cwd = self.cwd.clone();
        let log_path = log_path.to_path_buf();
        let abort_signal = self.abort_signal.clone();
        let signals = self.signals.clone();

        let exec_fut = async move { executor.execute(&step, &cwd, &log_path, wiring).await };
        tokio::pin!(exec_fut);

        let mut signals = signals.lock().await;
        let mut reason = StepAbortReason::Paused;
        let mut channel_closed = false;
        loop {
            tokio::select! {
                biased;

                result = &mut exec_fut => {
                    return match result {
                        Ok(output) => Ok(output),
                        Err(EngineError::Abort { monitoring_id, session_id }) => {
                            Err(StepRunOutcome::Interrupted { reason, monitoring_id, session_id })
                        }
                        Err(err) => Err(StepRunOutcome::Failed(err)),
                    };
                }
                signal = next_or_pending(&mut signals, channel_closed) => {
                    match signal {
                        None => {
                            channel_closed = true;
                            reason = StepAbortReason::Stopped;
                            abort_signal.abort();
                        }
                        Some(UserSignal::Pause) => {
                            reason = StepAbortReason::Paused;
                            abort_signal.abort();
                        }
                        Some(UserSignal::Skip) => {
                            reason = StepAbortReason::Skipped;
                            abort_signal.abort();
                        }
                        Some(UserSignal::ModeChange { autonomous }) => {
                            self.using_controller = autonomous;
                        }
                        Some(UserSignal::Prompt { .. }) => {}
                    }
                }
            }
        }
    }

    /// Persist a step's interrupted-but-resumable state: whatever
    /// session/monitoring id the engine had assigned before the abort took
    /// effect, with `completedAt` left unset (spec §3 "Per-Step
    /// Persistence" invariant: unset `completedAt` + set `sessionId` is
    /// resumable).
    fn persist_interrupted_record(
        &self,
        index: usize,
        started_at: u64,
        monitoring_id: Option<MonitoringId>,
        session_id: Option<codemachine_core::SessionId>,
    ) -> Result<(), EngineError> {
        let mut record = StepRecord::load(&self.root, index)?.unwrap_or_else(|| StepRecord::started(started_at));
        if let Some(monitoring_id) = monitoring_id {
            record.monitoring_id = Some(monitoring_id);
        }
        if session_id.is_some() {
            record.session_id = session_id;
        }
        record.save(&self.root, index)?;
        Ok(())
    }

    /// Common "step finished, enter `awaiting`" tail: non-empty chained
    /// prompts are queued for automatic replay before real input is ever
    /// consulted (spec §3 "chained prompts"); an empty queue marks the
    /// step's on-disk record complete.
    fn finish_step(&mut self, index: usize, exec_result: &ExecResult) -> Result<(), EngineError> {
        self.completed_steps.insert(index);
        let chained: Vec<ChainedPrompt> = exec_result
            .chained_prompts
            .iter()
            .map(|c| ChainedPrompt {
                name: c.name.clone(),
                label: c.label.clone(),
                content: c.content.clone(),
            })
            .collect();

        if chained.is_empty() {
            self.mark_record_completed(index)?;
        } else {
            self.sm.ctx_mut().prompt_queue = chained;
            self.sm.ctx_mut().prompt_queue_index = 0;
        }

        self.sm.step_complete(StepOutput {
            output: exec_result.output.clone(),
            monitoring_id: Some(exec_result.monitoring_id),
        });
        Ok(())
    }

    fn mark_record_completed(&self, index: usize) -> Result<(), EngineError> {
        if let Some(mut record) = StepRecord::load(&self.root, index)? {
            record.completed_at = Some(self.clock.epoch_ms());
            record.save(&self.root, index)?;
        }
        Ok(())
    }

    async fn run_triggered_agent(&mut self, target_agent_id: &str) -> Result<(), EngineError> {
        let Some(target) = self.steps.iter().find(|s| s.agent_id == target_agent_id).cloned() else {
            return Ok(());
        };
        let log_path = self.root.root().join("logs").join(format!("trigger-{target_agent_id}.log"));
        let wiring = ExecWiring {
            logger: self.logger.clone(),
            emitter: self.emitter.clone(),
            abort_signal: self.abort_signal.clone(),
            unique_agent_id: format!("{target_agent_id}#trigger"),
            resume_monitoring_id: None,
            resume_session_id: None,
            resume_prompt: None,
        };
        // Triggered runs are tracked through the usual monitoring/logging
        // wiring but do not alter the main step index (spec §4.9 Trigger).
        let _ = self.executor.execute(&target, &self.cwd, &log_path, wiring).await;
        Ok(())
    }

    async fn pump_awaiting(&mut self) -> Result<(), EngineError> {
        if self.awaiting_checkpoint {
            let index = self.sm.ctx().current_step_index;
            return match self.resolve_checkpoint().await {
                InputResult::Stop => {
                    self.sm.stop();
                    Ok(())
                }
                _ => {
                    self.awaiting_checkpoint = false;
                    self.mark_record_completed(index)?;
                    self.emitter.checkpoint_clear(index);
                    self.sm.skip_advance();
                    Ok(())
                }
            };
        }

        let (queue_len, queue_index) = {
            let ctx = self.sm.ctx();
            (ctx.prompt_queue.len(), ctx.prompt_queue_index)
        };
        if queue_index < queue_len {
            let next = self.sm.ctx().prompt_queue[queue_index].content.clone();
            self.sm.ctx_mut().prompt_queue_index += 1;
            self.pending_resume_prompt = Some(next.clone());
            self.sm.input_received(&next);
            return Ok(());
        }

        let input_ctx = InputContext {
            step_output: self.sm.ctx().current_output.as_ref().map(|o| o.output.clone()).unwrap_or_default(),
            step_index: self.sm.ctx().current_step_index,
            total_steps: self.sm.ctx().total_steps,
            prompt_queue: self.sm.ctx().prompt_queue.clone(),
            prompt_queue_index: self.sm.ctx().prompt_queue_index,
            cwd: self.cwd.clone(),
        };

        let result = if self.using_controller {
            match &self.controller_provider {
                Some(provider) => provider.get_input(&input_ctx).await,
                None => self.user_provider.get_input(&input_ctx).await,
            }
        } else {
            self.user_provider.get_input(&input_ctx).await
        };

        match result {
            InputResult::Input { value, .. } => {
                self.user_provider.deactivate().await;
                if !value.is_empty() {
                    self.pending_resume_prompt = Some(value.clone());
                }
                self.sm.input_received(&value);
            }
            InputResult::Skip => {
                self.user_provider.deactivate().await;
                self.sm.skip_advance();
            }
            InputResult::Stop => {
                self.user_provider.deactivate().await;
                self.sm.stop();
            }
            InputResult::ProviderSwitch { to } => {
                self.using_controller = matches!(to, ProviderKind::Auto);
            }
        }
        self.persist_controller_state().await?;
        Ok(())
    }

    /// Persist `controller.json` (spec §6.4): current autonomous-mode flag
    /// plus the controller's own identity, if any, so a restarted process
    /// can resume the controller's session.
    async fn persist_controller_state(&mut self) -> Result<(), EngineError> {
        self.controller_state.autonomous_mode = self.using_controller;
        if let Some(provider) = &self.controller_provider {
            let (monitoring_id, session_id) = provider.snapshot().await;
            if let (Some(monitoring_id), Some(session_id)) = (monitoring_id, session_id) {
                self.controller_state.controller_config = Some(ControllerConfig {
                    agent_id: provider.agent_id().to_string(),
                    session_id,
                    monitoring_id,
                });
            }
        }
        self.controller_state.save(&self.root)?;
        Ok(())
    }

    async fn resolve_checkpoint(&self) -> InputResult {
        let ctx = InputContext {
            step_output: self.sm.ctx().current_output.as_ref().map(|o| o.output.clone()).unwrap_or_default(),
            step_index: self.sm.ctx().current_step_index,
            total_steps: self.sm.ctx().total_steps,
            prompt_queue: vec![],
            prompt_queue_index: 0,
            cwd: self.cwd.clone(),
        };
        self.user_provider.get_input(&ctx).await
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

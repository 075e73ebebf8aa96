// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Workflow State Machine (spec §4.10 C10): `idle → running ⇄ awaiting
//! → (running | stopped | error | completed)` with a paused sub-state, a
//! chained-prompt queue, and a resume index.

use codemachine_core::MonitoringId;
use codemachine_runbook::ChainedPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Running,
    Awaiting,
    Completed,
    Stopped,
    Error,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Error)
    }
}

/// The output of the most recently completed step, carried into `awaiting`
/// so an input provider can read it (spec §3 `currentOutput`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepOutput {
    pub output: String,
    pub monitoring_id: Option<MonitoringId>,
}

/// In-memory workflow context, exclusively owned by the Runner (spec §3
/// "Workflow Context").
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub current_step_index: usize,
    pub total_steps: usize,
    pub auto_mode: bool,
    pub prompt_queue: Vec<ChainedPrompt>,
    pub prompt_queue_index: usize,
    pub current_output: Option<StepOutput>,
    pub paused: bool,
    pub last_error: Option<String>,
}

impl WorkflowContext {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step_index: 0,
            total_steps,
            auto_mode: false,
            prompt_queue: Vec::new(),
            prompt_queue_index: 0,
            current_output: None,
            paused: false,
            last_error: None,
        }
    }

    fn reset_chain(&mut self) {
        self.prompt_queue.clear();
        self.prompt_queue_index = 0;
    }

    fn has_more_steps(&self) -> bool {
        self.current_step_index + 1 < self.total_steps
    }
}

/// Drives the transition table in spec §4.10, verbatim.
pub struct StateMachine {
    state: WorkflowState,
    ctx: WorkflowContext,
}

impl StateMachine {
    pub fn new(total_steps: usize) -> Self {
        Self {
            state: WorkflowState::Idle,
            ctx: WorkflowContext::new(total_steps),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn ctx(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut WorkflowContext {
        &mut self.ctx
    }

    /// `idle —START→ running`
    pub fn start(&mut self) {
        debug_assert_eq!(self.state, WorkflowState::Idle);
        self.enter_running();
    }

    /// `running —STEP_COMPLETE(out)→ awaiting` (always enters awaiting;
    /// the empty-input short-circuit happens on the next
    /// `input_received("")` call).
    pub fn step_complete(&mut self, output: StepOutput) {
        self.ctx.current_output = Some(output);
        self.state = WorkflowState::Awaiting;
    }

    /// `running —STEP_ERROR(e)→ error`
    pub fn step_error(&mut self, error: impl Into<String>) {
        self.ctx.last_error = Some(error.into());
        self.state = WorkflowState::Error;
    }

    /// `running —PAUSE→ awaiting (ctx.paused=true)`
    pub fn pause(&mut self) {
        self.ctx.paused = true;
        self.state = WorkflowState::Awaiting;
    }

    /// `running —SKIP→ awaiting` (treated as step completion with empty
    /// output); the caller resolves the actual advance via
    /// [`StateMachine::skip_advance`].
    pub fn skip(&mut self) {
        self.ctx.current_output = Some(StepOutput::default());
        self.state = WorkflowState::Awaiting;
    }

    /// `awaiting —INPUT_RECEIVED(v)→ ...`: empty `v` advances (or
    /// completes); non-empty resumes the same step.
    pub fn input_received(&mut self, value: &str) {
        debug_assert_eq!(self.state, WorkflowState::Awaiting);
        if value.is_empty() {
            self.advance_or_complete();
        } else {
            self.enter_running();
        }
    }

    /// `awaiting —SKIP→ running (index++)` or `completed`.
    pub fn skip_advance(&mut self) {
        debug_assert_eq!(self.state, WorkflowState::Awaiting);
        self.advance_or_complete();
    }

    /// any —STOP→ `stopped`
    pub fn stop(&mut self) {
        self.state = WorkflowState::Stopped;
    }

    fn advance_or_complete(&mut self) {
        if self.ctx.has_more_steps() {
            self.ctx.current_step_index += 1;
            self.ctx.reset_chain();
            self.enter_running();
        } else {
            self.state = WorkflowState::Completed;
        }
    }

    fn enter_running(&mut self) {
        // Invariant: `paused` can be true only in `awaiting`; cleared on
        // the next `running` entry (spec §4.10).
        self.ctx.paused = false;
        self.state = WorkflowState::Running;
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;

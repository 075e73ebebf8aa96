// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow orchestration engine: the Event Bus, Monitoring Registry,
//! Behavior Evaluators, Step Executor, Input Providers, Workflow State
//! Machine, and the Runner that drives them end to end.

mod behavior;
mod bus;
mod error;
mod executor;
mod input;
mod monitoring;
mod runner;
mod state_machine;

pub use behavior::{evaluate_post, evaluate_skip_pre, ActiveLoop, BehaviorOutcome};
pub use bus::{Emitter, EventBus, Handler, SubscriptionId};
pub use error::EngineError;
pub use executor::{ExecWiring, StepExecutor};
pub use input::{
    ControllerInputProvider, InputContext, InputProvider, InputResult, ProviderKind,
    UserInputProvider, UserSignal,
};
pub use monitoring::{AgentNode, MonitoringRegistry};
pub use runner::{run, run_with_registry, RunOptions, RunOutcome, SubAgentPolicy};
pub use state_machine::{StateMachine, StepOutput, WorkflowContext, WorkflowState};

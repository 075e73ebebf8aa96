// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal terminal renderer: subscribes to the Event Bus and prints a
//! readable line per event. Stands in for the real UI adapter (out of
//! scope per spec §6.1); heavier front ends subscribe the same way.

use codemachine_core::Event;
use codemachine_engine::EventBus;

pub fn install(events: &EventBus) {
    events.subscribe(|event| {
        let line = render(event);
        if !line.is_empty() {
            println!("{line}");
        }
    });
}

fn render(event: &Event) -> String {
    match event {
        Event::WorkflowStarted { total_steps } => format!("workflow started ({total_steps} steps)"),
        Event::WorkflowStatus { status } => format!("workflow: {status}"),
        Event::WorkflowStopped { reason } => match reason {
            Some(reason) => format!("workflow stopped: {reason}"),
            None => "workflow stopped".to_string(),
        },
        Event::AgentAdded { name, engine_id, .. } => format!("+ agent {name} ({engine_id})"),
        Event::AgentStatus { monitoring_id, status } => format!("agent #{monitoring_id:?}: {status:?}"),
        Event::AgentModel { monitoring_id, model } => format!("agent #{monitoring_id:?} model: {model}"),
        Event::LoopState { step_index, iteration, max_iterations } => {
            format!("loop at step {step_index}: iteration {iteration}/{max_iterations}")
        }
        Event::LoopClear { step_index } => format!("loop cleared at step {step_index}"),
        Event::CheckpointState { step_index, reason } => match reason {
            Some(reason) => format!("checkpoint at step {step_index}: {reason}"),
            None => format!("checkpoint at step {step_index}"),
        },
        Event::CheckpointClear { step_index } => format!("checkpoint resolved at step {step_index}"),
        Event::SeparatorAdd { label, .. } => format!("── {label} ──"),
        Event::MessageLog { message } => message.clone(),
        _ => return String::new(),
    }
}

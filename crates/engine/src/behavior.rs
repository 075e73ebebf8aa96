// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavior Evaluators (spec §4.9 C9): Skip, Loop, Trigger, Checkpoint.
//! Tie-break order is Skip-pre → execute → Checkpoint → Trigger → Loop →
//! default advance; only the first firing evaluator takes effect per step
//! boundary.

use codemachine_core::{Directive, DirectiveAction};
use codemachine_runbook::{Behavior, Step};
use std::collections::HashSet;

/// A loop currently in progress; its skip set filters future step
/// executions (spec GLOSSARY "Active loop").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLoop {
    pub source_step_index: usize,
    pub source_agent: String,
    pub skip_set: HashSet<String>,
    pub iteration: u32,
}

/// The outcome of the post-execution evaluator chain for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BehaviorOutcome {
    Checkpoint { reason: Option<String> },
    Trigger { target_agent_id: String },
    Loop { steps_back: usize, iteration: u32, max_iterations: u32 },
    LoopExhausted,
    Advance,
}

/// Whether `step` should be skipped before it ever runs (spec §4.9 "Skip
/// (§also applied *before* execution)").
pub fn evaluate_skip_pre(
    step: &Step,
    already_completed: bool,
    active_loop: Option<&ActiveLoop>,
    selected_track: Option<&str>,
    selected_conditions: &HashSet<String>,
) -> bool {
    let execute_once_done = step.execute_once && already_completed;
    let loop_skipped = active_loop
        .map(|l| l.skip_set.contains(&step.agent_id))
        .unwrap_or(false);
    let filtered_out = !step.matches_filters(selected_track, selected_conditions);
    execute_once_done || loop_skipped || filtered_out
}

/// Evaluate post-execution behavior for `step`, given the directive the
/// agent wrote and any loop currently in progress for this step index
/// (spec §4.9 tie-break order: Checkpoint → Trigger → Loop → advance).
pub fn evaluate_post(
    step: &Step,
    step_index: usize,
    directive: &Directive,
    active_loop: Option<&ActiveLoop>,
) -> BehaviorOutcome {
    if directive.action == DirectiveAction::Checkpoint
        || matches!(step.behavior, Some(Behavior::Checkpoint))
    {
        return BehaviorOutcome::Checkpoint {
            reason: directive.reason.clone(),
        };
    }

    if directive.action == DirectiveAction::Trigger {
        if let Some(target) = directive.target.clone() {
            return BehaviorOutcome::Trigger { target_agent_id: target };
        }
    }
    if let Some(Behavior::Trigger { target_agent_id }) = &step.behavior {
        return BehaviorOutcome::Trigger {
            target_agent_id: target_agent_id.clone(),
        };
    }

    if directive.action == DirectiveAction::Loop {
        if let Some(Behavior::Loop { steps_back, max_iterations, .. }) = &step.behavior {
            let iteration = active_loop
                .filter(|l| l.source_step_index == step_index)
                .map(|l| l.iteration)
                .unwrap_or(0)
                + 1;
            // maxIterations=0 → loop never fires (spec §8 boundary).
            if *max_iterations == 0 || iteration > *max_iterations {
                return BehaviorOutcome::LoopExhausted;
            }
            return BehaviorOutcome::Loop {
                steps_back: *steps_back,
                iteration,
                max_iterations: *max_iterations,
            };
        }
    }

    BehaviorOutcome::Advance
}

#[cfg(test)]
#[path = "behavior_tests.rs"]
mod tests;

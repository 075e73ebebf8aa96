// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Step` model (spec §3): template-authored, immutable for the
//! duration of a run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What kind of unit a step represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Module,
    Controller,
    Separator,
}

/// One or more prompt files attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptPath {
    Single(String),
    Many(Vec<String>),
}

impl PromptPath {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            PromptPath::Single(p) => vec![p.as_str()],
            PromptPath::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

/// Reasoning effort hint passed through to the engine (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

/// A prompt queued for replay into the same engine session once the user
/// (or controller) chooses it (spec §3 "chained prompts").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedPrompt {
    pub name: String,
    pub label: String,
    pub content: String,
}

/// Post-step behavior a step may declare (spec §4.9 Behavior Evaluators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Behavior {
    Loop {
        steps_back: usize,
        max_iterations: u32,
        #[serde(default)]
        skip_set: HashSet<String>,
    },
    Trigger {
        target_agent_id: String,
    },
    Checkpoint,
}

/// One step in a template, as loaded by the Template Loader (C5) and
/// iterated by the Workflow State Machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<PromptPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_reasoning_effort: Option<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,
    #[serde(default)]
    pub execute_once: bool,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub chained_prompts: Vec<ChainedPrompt>,
    /// Display text for `separator` steps; unused otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Step {
    pub fn is_separator(&self) -> bool {
        self.kind == StepKind::Separator
    }

    pub fn is_controller(&self) -> bool {
        self.kind == StepKind::Controller
    }

    /// Whether this step belongs in a run given the selected track and
    /// condition set (spec §4.5):
    /// "its `tracks` is empty or contains the selected track, AND every
    /// element of its `conditions` is in the user-selected condition set."
    pub fn matches_filters(&self, selected_track: Option<&str>, selected_conditions: &HashSet<String>) -> bool {
        let track_ok = self.tracks.is_empty()
            || selected_track
                .map(|t| self.tracks.iter().any(|track| track == t))
                .unwrap_or(false);
        let conditions_ok = self
            .conditions
            .iter()
            .all(|c| selected_conditions.contains(c));
        track_ok && conditions_ok
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;

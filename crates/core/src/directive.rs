// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The behavior directive file (spec §3 "Behavior Directive File"), the
//! memory-backed channel an autonomous controller uses to steer the Runner
//! between steps: `continue`, `loop` back to an earlier step, `trigger` a
//! jump, or request a `checkpoint` pause.

use serde::{Deserialize, Serialize};

/// One decision written by a controller into `memory/directive.json` and
/// consumed once by the Runner after the controller's turn completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub action: DirectiveAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Default for Directive {
    fn default() -> Self {
        Self::continue_()
    }
}

impl Directive {
    pub fn continue_() -> Self {
        Self {
            action: DirectiveAction::Continue,
            reason: None,
            target: None,
        }
    }

    pub fn loop_to(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: DirectiveAction::Loop,
            reason: Some(reason.into()),
            target: Some(target.into()),
        }
    }

    pub fn trigger(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: DirectiveAction::Trigger,
            reason: Some(reason.into()),
            target: Some(target.into()),
        }
    }

    pub fn checkpoint(reason: impl Into<String>) -> Self {
        Self {
            action: DirectiveAction::Checkpoint,
            reason: Some(reason.into()),
            target: None,
        }
    }
}

/// The action a [`Directive`] requests of the Runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveAction {
    Continue,
    Loop,
    Trigger,
    Checkpoint,
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `memory/directive.json` (spec §3 "Behavior Directive File"): the
//! running agent's channel for requesting loop/trigger/checkpoint
//! behavior after its turn.

use crate::atomic::{read_json_or_default, write_json_atomic};
use crate::error::StorageError;
use crate::paths::StorageRoot;
use codemachine_core::Directive;

/// Read the current directive, defaulting to `continue` when the file is
/// absent (a fresh step has no pending directive).
pub fn read_directive(root: &StorageRoot) -> Result<Directive, StorageError> {
    read_json_or_default(&root.directive_path())
}

pub fn write_directive(root: &StorageRoot, directive: &Directive) -> Result<(), StorageError> {
    write_json_atomic(&root.directive_path(), directive)
}

/// Reset to `{action: "continue"}` before each step begins (spec §3:
/// "the engine resets it to `{action:"continue"}` before each step").
pub fn reset_directive(root: &StorageRoot) -> Result<(), StorageError> {
    write_directive(root, &Directive::continue_())
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

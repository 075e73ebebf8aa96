// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `template.json` (spec §6.4): the selected template and track/condition
//! filter, persisted so a resumed run re-applies the same selection.

use crate::atomic::{read_json_or_default, write_json_atomic};
use crate::error::StorageError;
use crate::paths::StorageRoot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateState {
    pub template_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_track: Option<String>,
    #[serde(default)]
    pub selected_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl TemplateState {
    pub fn load(root: &StorageRoot) -> Result<Self, StorageError> {
        read_json_or_default(&root.template_path())
    }

    pub fn save(&self, root: &StorageRoot) -> Result<(), StorageError> {
        write_json_atomic(&root.template_path(), self)
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

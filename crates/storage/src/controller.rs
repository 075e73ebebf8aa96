// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `controller.json` (spec §6.4): whether the run is in autonomous mode
//! and, if so, the controller's own identity for resume.

use crate::atomic::{read_json_or_default, write_json_atomic};
use crate::error::StorageError;
use crate::paths::StorageRoot;
use codemachine_core::{MonitoringId, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub agent_id: String,
    pub session_id: SessionId,
    pub monitoring_id: MonitoringId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    #[serde(default)]
    pub autonomous_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_config: Option<ControllerConfig>,
}

impl ControllerState {
    pub fn load(root: &StorageRoot) -> Result<Self, StorageError> {
        read_json_or_default(&root.controller_path())
    }

    pub fn save(&self, root: &StorageRoot) -> Result<(), StorageError> {
        write_json_atomic(&root.controller_path(), self)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

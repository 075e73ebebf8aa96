// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steps/<index>.json` (spec §3 "Per-Step Persistence", §6.4). One
//! record per step index in the filtered run; the Runner must write this
//! before any child of the step does (spec §8 invariant 3).

use crate::atomic::{read_json_opt, write_json_atomic};
use crate::error::StorageError;
use crate::paths::StorageRoot;
use codemachine_core::{MonitoringId, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_id: Option<MonitoringId>,
    pub started_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    pub chain_index: usize,
}

impl StepRecord {
    pub fn started(started_at: u64) -> Self {
        Self {
            session_id: None,
            monitoring_id: None,
            started_at,
            completed_at: None,
            chain_index: 0,
        }
    }

    /// A step is resumable iff it's unfinished but has already acquired a
    /// session (spec §3 invariant: "if `completedAt` is unset and
    /// `sessionId` is set, the step is resumable; otherwise the step is
    /// fresh").
    pub fn is_resumable(&self) -> bool {
        self.completed_at.is_none() && self.session_id.is_some()
    }

    pub fn load(root: &StorageRoot, index: usize) -> Result<Option<Self>, StorageError> {
        read_json_opt(&root.step_path(index))
    }

    pub fn save(&self, root: &StorageRoot, index: usize) -> Result<(), StorageError> {
        write_json_atomic(&root.step_path(index), self)
    }
}

#[cfg(test)]
#[path = "step_record_tests.rs"]
mod tests;

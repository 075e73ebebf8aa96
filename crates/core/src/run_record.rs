// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent Run Record (spec §3), the unit the Monitoring Registry (C2)
//! creates per execution or resume and never mutates except through its
//! own registered setters.

use crate::id::{MonitoringId, SessionId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one agent run, as tracked by the Monitoring
/// Registry and mirrored onto the Workflow State Machine's step loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Delegated,
    Awaiting,
    Completed,
    Failed,
    Skipped,
    Paused,
}

impl RunStatus {
    /// True once a run can no longer transition (spec §8 invariant: a
    /// completed/failed/skipped run's `endTime` is set and stays set).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Skipped
        )
    }
}

/// Rolling token/cost accounting for a run, last-write-wins per field
/// (spec §4.2 `updateTelemetry`, REDESIGN FLAGS "telemetry delta vs
/// snapshot").
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub tokens_in: u64,
    pub tokens_out: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Telemetry {
    /// Merge an incoming snapshot, overwriting every field the snapshot
    /// sets explicitly.
    pub fn merge(&mut self, delta: Telemetry) {
        self.tokens_in = delta.tokens_in;
        self.tokens_out = delta.tokens_out;
        if delta.cached.is_some() {
            self.cached = delta.cached;
        }
        if delta.cost.is_some() {
            self.cost = delta.cost;
        }
    }
}

/// One agent/sub-agent execution, created by the Monitoring Registry on
/// `register` and updated in place for the rest of its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunRecord {
    pub monitoring_id: MonitoringId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MonitoringId>,
    pub name: String,
    pub engine_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub status: RunStatus,
    pub start_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    pub log_path: String,
    #[serde(default)]
    pub telemetry: Telemetry,
}

impl AgentRunRecord {
    pub fn new(
        monitoring_id: MonitoringId,
        parent_id: Option<MonitoringId>,
        name: impl Into<String>,
        engine_id: impl Into<String>,
        log_path: impl Into<String>,
        start_time: u64,
    ) -> Self {
        Self {
            monitoring_id,
            parent_id,
            name: name.into(),
            engine_id: engine_id.into(),
            model: None,
            session_id: None,
            status: RunStatus::Pending,
            start_time,
            end_time: None,
            log_path: log_path.into(),
            telemetry: Telemetry::default(),
        }
    }

    /// Stamp `end_time` the first time the run reaches a terminal status;
    /// a no-op on subsequent calls (spec §3 invariant: `endTime ≥
    /// startTime` when set, and it is set at most once).
    pub fn mark_status(&mut self, status: RunStatus, now_ms: u64) {
        self.status = status;
        if status.is_terminal() && self.end_time.is_none() {
            self.end_time = Some(now_ms.max(self.start_time));
        }
    }
}

#[cfg(test)]
#[path = "run_record_tests.rs"]
mod tests;

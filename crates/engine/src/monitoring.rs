// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Monitoring Registry (spec §4.2 C2): assigns numeric ids to every
//! agent/sub-agent run and tracks status, session, telemetry, and log path.
//! An injected handle rather than a bare `static` (spec §9 REDESIGN FLAGS
//! "Singleton registries → injected handles"); [`MonitoringRegistry::shared`]
//! provides the process-wide default for the CLI binary.

use codemachine_core::{
    AgentRunRecord, Clock, MonitoringId, MonitoringIdGen, RunStatus, SessionId, Telemetry,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

struct Inner {
    records: HashMap<u64, AgentRunRecord>,
    children: HashMap<u64, Vec<u64>>,
    roots: Vec<u64>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

/// One node of the forest returned by [`MonitoringRegistry::build_tree`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentNode {
    pub record: AgentRunRecord,
    pub children: Vec<AgentNode>,
}

pub struct MonitoringRegistry {
    inner: Mutex<Inner>,
    id_gen: MonitoringIdGen,
    clock: Arc<dyn Clock>,
}

static SHARED: OnceLock<Arc<MonitoringRegistry>> = OnceLock::new();

impl MonitoringRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            id_gen: MonitoringIdGen::new(),
            clock,
        }
    }

    /// The process-wide default instance (spec §4.2 "a process-wide
    /// singleton"). Tests should construct their own isolated instance via
    /// [`MonitoringRegistry::new`] instead.
    pub fn shared() -> Arc<MonitoringRegistry> {
        SHARED
            .get_or_init(|| Arc::new(MonitoringRegistry::new(Arc::new(codemachine_core::SystemClock))))
            .clone()
    }

    /// Register a new run and return its monotonic id (spec §4.2, §8
    /// invariant 4).
    pub fn register(
        &self,
        name: impl Into<String>,
        engine_id: impl Into<String>,
        parent_id: Option<MonitoringId>,
        log_path: impl Into<String>,
    ) -> MonitoringId {
        let id = self.id_gen.next();
        let record = AgentRunRecord::new(
            id,
            parent_id,
            name,
            engine_id,
            log_path,
            self.clock.epoch_ms(),
        );
        let mut inner = self.inner.lock();
        inner.records.insert(id.get(), record);
        match parent_id {
            Some(parent) => inner.children.entry(parent.get()).or_default().push(id.get()),
            None => inner.roots.push(id.get()),
        }
        id
    }

    pub fn get_agent(&self, id: MonitoringId) -> Option<AgentRunRecord> {
        self.inner.lock().records.get(&id.get()).cloned()
    }

    pub fn get_children(&self, id: MonitoringId) -> Vec<AgentRunRecord> {
        let inner = self.inner.lock();
        inner
            .children
            .get(&id.get())
            .into_iter()
            .flatten()
            .filter_map(|child_id| inner.records.get(child_id).cloned())
            .collect()
    }

    /// A forest rooted at agents without a parent; children ordered by
    /// insertion (spec §4.2 `buildTree`).
    pub fn build_tree(&self) -> Vec<AgentNode> {
        let inner = self.inner.lock();
        inner
            .roots
            .iter()
            .filter_map(|root_id| Self::build_node(&inner, *root_id))
            .collect()
    }

    fn build_node(inner: &Inner, id: u64) -> Option<AgentNode> {
        let record = inner.records.get(&id)?.clone();
        let children = inner
            .children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child_id| Self::build_node(inner, *child_id))
            .collect();
        Some(AgentNode { record, children })
    }

    pub fn mark_status(&self, id: MonitoringId, status: RunStatus) {
        let now = self.clock.epoch_ms();
        if let Some(record) = self.inner.lock().records.get_mut(&id.get()) {
            record.mark_status(status, now);
        }
    }

    pub fn mark_paused(&self, id: MonitoringId) {
        self.mark_status(id, RunStatus::Paused);
    }

    pub fn set_session(&self, id: MonitoringId, session_id: SessionId) {
        if let Some(record) = self.inner.lock().records.get_mut(&id.get()) {
            record.session_id = Some(session_id);
        }
    }

    /// The session id an engine attached to this run, if any (spec §4.2);
    /// used to carry a resumable session id onto an `Abort` surfaced after
    /// the engine call already resolved.
    pub fn session_id(&self, id: MonitoringId) -> Option<SessionId> {
        self.inner.lock().records.get(&id.get())?.session_id.clone()
    }

    pub fn set_model(&self, id: MonitoringId, model: impl Into<String>) {
        if let Some(record) = self.inner.lock().records.get_mut(&id.get()) {
            record.model = Some(model.into());
        }
    }

    /// Rewrite the record's log path once the real on-disk path is known
    /// (the path is derived from the id the registry itself assigns, so
    /// callers register first and correct the path immediately after).
    pub fn set_log_path(&self, id: MonitoringId, log_path: impl Into<String>) {
        if let Some(record) = self.inner.lock().records.get_mut(&id.get()) {
            record.log_path = log_path.into();
        }
    }

    /// Last-write-wins telemetry update (spec §9 "Telemetry delta vs.
    /// snapshot"; this repo keeps the source's snapshot semantics).
    pub fn update_telemetry(&self, id: MonitoringId, delta: Telemetry) {
        if let Some(record) = self.inner.lock().records.get_mut(&id.get()) {
            record.telemetry.merge(delta);
        }
    }

    pub fn get_active_agents(&self) -> Vec<AgentRunRecord> {
        self.inner
            .lock()
            .records
            .values()
            .filter(|r| !r.status.is_terminal())
            .cloned()
            .collect()
    }

    pub fn clear_all(&self) {
        *self.inner.lock() = Inner::default();
    }
}

#[cfg(test)]
#[path = "monitoring_tests.rs"]
mod tests;

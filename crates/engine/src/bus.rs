// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Event Bus & Emitter (spec §4.1 C1): ordered in-process pub/sub of
//! typed workflow events, fanned out to 0..N subscribers. Dispatch is
//! synchronous and single-threaded; a handler that panics is caught so it
//! cannot abort dispatch to the handlers after it.

use codemachine_core::{Event, InputSource, MonitoringId, RunStatus, Telemetry};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Token returned by `subscribe`, passed back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    handlers: Vec<(SubscriptionId, Handler)>,
}

/// Single-threaded, synchronous, FIFO-per-subscriber event bus (spec §4.1,
/// §5 "Ordering guarantees").
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; returns a token for `unsubscribe`. Handlers are
    /// invoked in registration order on every subsequent `publish`.
    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner.lock().handlers.push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().handlers.retain(|(h, _)| *h != id);
    }

    pub fn has_subscribers(&self) -> bool {
        !self.inner.lock().handlers.is_empty()
    }

    /// Dispatch `event` to every subscriber in registration order. A
    /// subscriber's panic is logged and does not prevent later subscribers
    /// from receiving the event (spec §4.1: "handler exceptions are logged
    /// but do not abort dispatch").
    pub fn publish(&self, event: Event) {
        // Snapshot the handler list (cheap Arc clones) so a handler can
        // itself subscribe/unsubscribe without deadlocking on its own
        // dispatch.
        let handlers: Vec<Handler> = self
            .inner
            .lock()
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                tracing::warn!(event = ?event, "event subscriber panicked");
            }
        }
    }
}

/// Typed facade over [`EventBus`], one method per event family (spec §4.1
/// "a typed facade with one method per event family").
#[derive(Clone)]
pub struct Emitter {
    bus: Arc<EventBus>,
}

impl Emitter {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn workflow_started(&self, total_steps: usize) {
        self.bus.publish(Event::WorkflowStarted { total_steps });
    }

    pub fn workflow_status(&self, status: impl Into<String>) {
        self.bus.publish(Event::WorkflowStatus { status: status.into() });
    }

    pub fn workflow_stopped(&self, reason: Option<String>) {
        self.bus.publish(Event::WorkflowStopped { reason });
    }

    pub fn agent_added(&self, monitoring_id: MonitoringId, parent_id: Option<MonitoringId>, name: impl Into<String>, engine_id: impl Into<String>) {
        self.bus.publish(Event::AgentAdded {
            monitoring_id,
            parent_id,
            name: name.into(),
            engine_id: engine_id.into(),
        });
    }

    pub fn agent_status(&self, monitoring_id: MonitoringId, status: RunStatus) {
        self.bus.publish(Event::AgentStatus { monitoring_id, status });
    }

    pub fn agent_engine(&self, monitoring_id: MonitoringId, engine_id: impl Into<String>) {
        self.bus.publish(Event::AgentEngine {
            monitoring_id,
            engine_id: engine_id.into(),
        });
    }

    pub fn agent_model(&self, monitoring_id: MonitoringId, model: impl Into<String>) {
        self.bus.publish(Event::AgentModel {
            monitoring_id,
            model: model.into(),
        });
    }

    pub fn agent_telemetry(&self, monitoring_id: MonitoringId, telemetry: Telemetry) {
        self.bus.publish(Event::AgentTelemetry { monitoring_id, telemetry });
    }

    pub fn agent_reset(&self, monitoring_id: MonitoringId) {
        self.bus.publish(Event::AgentReset { monitoring_id });
    }

    pub fn controller_status(&self, monitoring_id: MonitoringId, status: RunStatus) {
        self.bus.publish(Event::ControllerStatus { monitoring_id, status });
    }

    pub fn controller_telemetry(&self, monitoring_id: MonitoringId, telemetry: Telemetry) {
        self.bus.publish(Event::ControllerTelemetry { monitoring_id, telemetry });
    }

    pub fn subagent_added(&self, monitoring_id: MonitoringId, parent_id: MonitoringId, name: impl Into<String>) {
        self.bus.publish(Event::SubagentAdded {
            monitoring_id,
            parent_id,
            name: name.into(),
        });
    }

    pub fn subagent_status(&self, monitoring_id: MonitoringId, status: RunStatus) {
        self.bus.publish(Event::SubagentStatus { monitoring_id, status });
    }

    pub fn loop_state(&self, step_index: usize, iteration: u32, max_iterations: u32) {
        self.bus.publish(Event::LoopState {
            step_index,
            iteration,
            max_iterations,
        });
    }

    pub fn loop_clear(&self, step_index: usize) {
        self.bus.publish(Event::LoopClear { step_index });
    }

    pub fn checkpoint_state(&self, step_index: usize, reason: Option<String>) {
        self.bus.publish(Event::CheckpointState { step_index, reason });
    }

    pub fn checkpoint_clear(&self, step_index: usize) {
        self.bus.publish(Event::CheckpointClear { step_index });
    }

    pub fn input_state(&self, active: bool, source: InputSource) {
        self.bus.publish(Event::InputState { active, source });
    }

    pub fn separator_add(&self, step_index: usize, label: impl Into<String>) {
        self.bus.publish(Event::SeparatorAdd {
            step_index,
            label: label.into(),
        });
    }

    pub fn message_log(&self, message: impl Into<String>) {
        self.bus.publish(Event::MessageLog { message: message.into() });
    }

    pub fn monitoring_register(&self, monitoring_id: MonitoringId, name: impl Into<String>, engine_id: impl Into<String>, parent_id: Option<MonitoringId>) {
        self.bus.publish(Event::MonitoringRegister {
            monitoring_id,
            name: name.into(),
            engine_id: engine_id.into(),
            parent_id,
        });
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

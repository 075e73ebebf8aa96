// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed event sum published on the Event Bus (spec §3 "Event", §4.1).
//! Every variant carries only serializable fields so the same enum can be
//! fanned out to an in-process UI adapter or logged verbatim.

use crate::id::MonitoringId;
use crate::run_record::{RunStatus, Telemetry};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a piece of post-step input originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    User,
    Controller,
}

/// The wire shape of every known event family, tagged by `type`. Kept
/// private: [`Event`] is the public surface so an unrecognized `type` tag
/// can fall back to [`Event::Custom`] instead of a hard deserialize error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
enum KnownEvent {
    #[serde(rename = "workflow:started")]
    WorkflowStarted { total_steps: usize },
    #[serde(rename = "workflow:status")]
    WorkflowStatus { status: String },
    #[serde(rename = "workflow:stopped")]
    WorkflowStopped { reason: Option<String> },

    #[serde(rename = "agent:added")]
    AgentAdded {
        monitoring_id: MonitoringId,
        parent_id: Option<MonitoringId>,
        name: String,
        engine_id: String,
    },
    #[serde(rename = "agent:status")]
    AgentStatus {
        monitoring_id: MonitoringId,
        status: RunStatus,
    },
    #[serde(rename = "agent:engine")]
    AgentEngine {
        monitoring_id: MonitoringId,
        engine_id: String,
    },
    #[serde(rename = "agent:model")]
    AgentModel {
        monitoring_id: MonitoringId,
        model: String,
    },
    #[serde(rename = "agent:telemetry")]
    AgentTelemetry {
        monitoring_id: MonitoringId,
        telemetry: Telemetry,
    },
    #[serde(rename = "agent:reset")]
    AgentReset { monitoring_id: MonitoringId },

    #[serde(rename = "controller:info")]
    ControllerInfo {
        monitoring_id: MonitoringId,
        name: String,
    },
    #[serde(rename = "controller:engine")]
    ControllerEngine {
        monitoring_id: MonitoringId,
        engine_id: String,
    },
    #[serde(rename = "controller:model")]
    ControllerModel {
        monitoring_id: MonitoringId,
        model: String,
    },
    #[serde(rename = "controller:telemetry")]
    ControllerTelemetry {
        monitoring_id: MonitoringId,
        telemetry: Telemetry,
    },
    #[serde(rename = "controller:status")]
    ControllerStatus {
        monitoring_id: MonitoringId,
        status: RunStatus,
    },
    #[serde(rename = "controller:monitoring")]
    ControllerMonitoring { monitoring_id: MonitoringId },

    #[serde(rename = "subagent:added")]
    SubagentAdded {
        monitoring_id: MonitoringId,
        parent_id: MonitoringId,
        name: String,
    },
    #[serde(rename = "subagent:batch")]
    SubagentBatch {
        parent_id: MonitoringId,
        monitoring_ids: Vec<MonitoringId>,
    },
    #[serde(rename = "subagent:status")]
    SubagentStatus {
        monitoring_id: MonitoringId,
        status: RunStatus,
    },
    #[serde(rename = "subagent:clear")]
    SubagentClear { parent_id: MonitoringId },

    #[serde(rename = "loop:state")]
    LoopState {
        step_index: usize,
        iteration: u32,
        max_iterations: u32,
    },
    #[serde(rename = "loop:clear")]
    LoopClear { step_index: usize },

    #[serde(rename = "checkpoint:state")]
    CheckpointState {
        step_index: usize,
        reason: Option<String>,
    },
    #[serde(rename = "checkpoint:clear")]
    CheckpointClear { step_index: usize },

    #[serde(rename = "input:state")]
    InputState { active: bool, source: InputSource },

    #[serde(rename = "separator:add")]
    SeparatorAdd { step_index: usize, label: String },

    #[serde(rename = "message:log")]
    MessageLog { message: String },

    #[serde(rename = "monitoring:register")]
    MonitoringRegister {
        monitoring_id: MonitoringId,
        name: String,
        engine_id: String,
        parent_id: Option<MonitoringId>,
    },
}

impl From<KnownEvent> for Event {
    fn from(known: KnownEvent) -> Self {
        match known {
            KnownEvent::WorkflowStarted { total_steps } => Event::WorkflowStarted { total_steps },
            KnownEvent::WorkflowStatus { status } => Event::WorkflowStatus { status },
            KnownEvent::WorkflowStopped { reason } => Event::WorkflowStopped { reason },
            KnownEvent::AgentAdded { monitoring_id, parent_id, name, engine_id } => {
                Event::AgentAdded { monitoring_id, parent_id, name, engine_id }
            }
            KnownEvent::AgentStatus { monitoring_id, status } => Event::AgentStatus { monitoring_id, status },
            KnownEvent::AgentEngine { monitoring_id, engine_id } => Event::AgentEngine { monitoring_id, engine_id },
            KnownEvent::AgentModel { monitoring_id, model } => Event::AgentModel { monitoring_id, model },
            KnownEvent::AgentTelemetry { monitoring_id, telemetry } => {
                Event::AgentTelemetry { monitoring_id, telemetry }
            }
            KnownEvent::AgentReset { monitoring_id } => Event::AgentReset { monitoring_id },
            KnownEvent::ControllerInfo { monitoring_id, name } => Event::ControllerInfo { monitoring_id, name },
            KnownEvent::ControllerEngine { monitoring_id, engine_id } => {
                Event::ControllerEngine { monitoring_id, engine_id }
            }
            KnownEvent::ControllerModel { monitoring_id, model } => Event::ControllerModel { monitoring_id, model },
            KnownEvent::ControllerTelemetry { monitoring_id, telemetry } => {
                Event::ControllerTelemetry { monitoring_id, telemetry }
            }
            KnownEvent::ControllerStatus { monitoring_id, status } => {
                Event::ControllerStatus { monitoring_id, status }
            }
            KnownEvent::ControllerMonitoring { monitoring_id } => Event::ControllerMonitoring { monitoring_id },
            KnownEvent::SubagentAdded { monitoring_id, parent_id, name } => {
                Event::SubagentAdded { monitoring_id, parent_id, name }
            }
            KnownEvent::SubagentBatch { parent_id, monitoring_ids } => {
                Event::SubagentBatch { parent_id, monitoring_ids }
            }
            KnownEvent::SubagentStatus { monitoring_id, status } => Event::SubagentStatus { monitoring_id, status },
            KnownEvent::SubagentClear { parent_id } => Event::SubagentClear { parent_id },
            KnownEvent::LoopState { step_index, iteration, max_iterations } => {
                Event::LoopState { step_index, iteration, max_iterations }
            }
            KnownEvent::LoopClear { step_index } => Event::LoopClear { step_index },
            KnownEvent::CheckpointState { step_index, reason } => Event::CheckpointState { step_index, reason },
            KnownEvent::CheckpointClear { step_index } => Event::CheckpointClear { step_index },
            KnownEvent::InputState { active, source } => Event::InputState { active, source },
            KnownEvent::SeparatorAdd { step_index, label } => Event::SeparatorAdd { step_index, label },
            KnownEvent::MessageLog { message } => Event::MessageLog { message },
            KnownEvent::MonitoringRegister { monitoring_id, name, engine_id, parent_id } => {
                Event::MonitoringRegister { monitoring_id, name, engine_id, parent_id }
            }
        }
    }
}

/// A single typed workflow event, tagged by `type` for forward-compatible
/// wire serialization (subscribers match on the Rust variant directly; the
/// `type` tag only matters when an event crosses process boundaries, e.g.
/// through a UI adapter's transport). An unrecognized `type` tag deserializes
/// to [`Event::Custom`] rather than erroring, so a replayed event log
/// written by a newer binary doesn't break an older one.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WorkflowStarted { total_steps: usize },
    WorkflowStatus { status: String },
    WorkflowStopped { reason: Option<String> },

    AgentAdded {
        monitoring_id: MonitoringId,
        parent_id: Option<MonitoringId>,
        name: String,
        engine_id: String,
    },
    AgentStatus { monitoring_id: MonitoringId, status: RunStatus },
    AgentEngine { monitoring_id: MonitoringId, engine_id: String },
    AgentModel { monitoring_id: MonitoringId, model: String },
    AgentTelemetry { monitoring_id: MonitoringId, telemetry: Telemetry },
    AgentReset { monitoring_id: MonitoringId },

    ControllerInfo { monitoring_id: MonitoringId, name: String },
    ControllerEngine { monitoring_id: MonitoringId, engine_id: String },
    ControllerModel { monitoring_id: MonitoringId, model: String },
    ControllerTelemetry { monitoring_id: MonitoringId, telemetry: Telemetry },
    ControllerStatus { monitoring_id: MonitoringId, status: RunStatus },
    ControllerMonitoring { monitoring_id: MonitoringId },

    SubagentAdded {
        monitoring_id: MonitoringId,
        parent_id: MonitoringId,
        name: String,
    },
    SubagentBatch {
        parent_id: MonitoringId,
        monitoring_ids: Vec<MonitoringId>,
    },
    SubagentStatus { monitoring_id: MonitoringId, status: RunStatus },
    SubagentClear { parent_id: MonitoringId },

    LoopState {
        step_index: usize,
        iteration: u32,
        max_iterations: u32,
    },
    LoopClear { step_index: usize },

    CheckpointState { step_index: usize, reason: Option<String> },
    CheckpointClear { step_index: usize },

    InputState { active: bool, source: InputSource },

    SeparatorAdd { step_index: usize, label: String },

    MessageLog { message: String },

    MonitoringRegister {
        monitoring_id: MonitoringId,
        name: String,
        engine_id: String,
        parent_id: Option<MonitoringId>,
    },

    /// Catch-all for a `type` tag this build doesn't recognize (spec §4.1
    /// "forward-compatibility of persisted/replayed events"). `payload`
    /// holds the full original object, `type` included, so it round-trips
    /// byte-for-byte through another `Custom`-unaware deserialize.
    Custom { kind: String, payload: serde_json::Value },
}

impl TryFrom<Event> for KnownEvent {
    type Error = serde_json::Value;

    /// Every non-`Custom` arm has a matching `KnownEvent` arm with
    /// identical fields; `Custom` has none, so it round-trips as itself.
    fn try_from(event: Event) -> Result<Self, Self::Error> {
        Ok(match event {
            Event::WorkflowStarted { total_steps } => KnownEvent::WorkflowStarted { total_steps },
            Event::WorkflowStatus { status } => KnownEvent::WorkflowStatus { status },
            Event::WorkflowStopped { reason } => KnownEvent::WorkflowStopped { reason },
            Event::AgentAdded { monitoring_id, parent_id, name, engine_id } => {
                KnownEvent::AgentAdded { monitoring_id, parent_id, name, engine_id }
            }
            Event::AgentStatus { monitoring_id, status } => KnownEvent::AgentStatus { monitoring_id, status },
            Event::AgentEngine { monitoring_id, engine_id } => KnownEvent::AgentEngine { monitoring_id, engine_id },
            Event::AgentModel { monitoring_id, model } => KnownEvent::AgentModel { monitoring_id, model },
            Event::AgentTelemetry { monitoring_id, telemetry } => {
                KnownEvent::AgentTelemetry { monitoring_id, telemetry }
            }
            Event::AgentReset { monitoring_id } => KnownEvent::AgentReset { monitoring_id },
            Event::ControllerInfo { monitoring_id, name } => KnownEvent::ControllerInfo { monitoring_id, name },
            Event::ControllerEngine { monitoring_id, engine_id } => {
                KnownEvent::ControllerEngine { monitoring_id, engine_id }
            }
            Event::ControllerModel { monitoring_id, model } => KnownEvent::ControllerModel { monitoring_id, model },
            Event::ControllerTelemetry { monitoring_id, telemetry } => {
                KnownEvent::ControllerTelemetry { monitoring_id, telemetry }
            }
            Event::ControllerStatus { monitoring_id, status } => {
                KnownEvent::ControllerStatus { monitoring_id, status }
            }
            Event::ControllerMonitoring { monitoring_id } => KnownEvent::ControllerMonitoring { monitoring_id },
            Event::SubagentAdded { monitoring_id, parent_id, name } => {
                KnownEvent::SubagentAdded { monitoring_id, parent_id, name }
            }
            Event::SubagentBatch { parent_id, monitoring_ids } => {
                KnownEvent::SubagentBatch { parent_id, monitoring_ids }
            }
            Event::SubagentStatus { monitoring_id, status } => KnownEvent::SubagentStatus { monitoring_id, status },
            Event::SubagentClear { parent_id } => KnownEvent::SubagentClear { parent_id },
            Event::LoopState { step_index, iteration, max_iterations } => {
                KnownEvent::LoopState { step_index, iteration, max_iterations }
            }
            Event::LoopClear { step_index } => KnownEvent::LoopClear { step_index },
            Event::CheckpointState { step_index, reason } => KnownEvent::CheckpointState { step_index, reason },
            Event::CheckpointClear { step_index } => KnownEvent::CheckpointClear { step_index },
            Event::InputState { active, source } => KnownEvent::InputState { active, source },
            Event::SeparatorAdd { step_index, label } => KnownEvent::SeparatorAdd { step_index, label },
            Event::MessageLog { message } => KnownEvent::MessageLog { message },
            Event::MonitoringRegister { monitoring_id, name, engine_id, parent_id } => {
                KnownEvent::MonitoringRegister { monitoring_id, name, engine_id, parent_id }
            }
            Event::Custom { payload, .. } => return Err(payload),
        })
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match KnownEvent::try_from(self.clone()) {
            Ok(known) => known.serialize(serializer),
            Err(payload) => payload.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match serde_json::from_value::<KnownEvent>(value.clone()) {
            Ok(known) => Ok(Event::from(known)),
            Err(_) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| D::Error::custom("event object has no \"type\" field"))?
                    .to_string();
                Ok(Event::Custom { kind, payload: value })
            }
        }
    }
}

impl Event {
    /// The `type` tag this event serializes under (spec §4.1 `name()`).
    pub fn name(&self) -> &str {
        match self {
            Event::WorkflowStarted { .. } => "workflow:started",
            Event::WorkflowStatus { .. } => "workflow:status",
            Event::WorkflowStopped { .. } => "workflow:stopped",
            Event::AgentAdded { .. } => "agent:added",
            Event::AgentStatus { .. } => "agent:status",
            Event::AgentEngine { .. } => "agent:engine",
            Event::AgentModel { .. } => "agent:model",
            Event::AgentTelemetry { .. } => "agent:telemetry",
            Event::AgentReset { .. } => "agent:reset",
            Event::ControllerInfo { .. } => "controller:info",
            Event::ControllerEngine { .. } => "controller:engine",
            Event::ControllerModel { .. } => "controller:model",
            Event::ControllerTelemetry { .. } => "controller:telemetry",
            Event::ControllerStatus { .. } => "controller:status",
            Event::ControllerMonitoring { .. } => "controller:monitoring",
            Event::SubagentAdded { .. } => "subagent:added",
            Event::SubagentBatch { .. } => "subagent:batch",
            Event::SubagentStatus { .. } => "subagent:status",
            Event::SubagentClear { .. } => "subagent:clear",
            Event::LoopState { .. } => "loop:state",
            Event::LoopClear { .. } => "loop:clear",
            Event::CheckpointState { .. } => "checkpoint:state",
            Event::CheckpointClear { .. } => "checkpoint:clear",
            Event::InputState { .. } => "input:state",
            Event::SeparatorAdd { .. } => "separator:add",
            Event::MessageLog { .. } => "message:log",
            Event::MonitoringRegister { .. } => "monitoring:register",
            Event::Custom { kind, .. } => kind.as_str(),
        }
    }

    /// A structured, single-line summary for tracing (spec §4.1
    /// `log_summary()`); never includes a trailing newline.
    pub fn log_summary(&self) -> String {
        match self {
            Event::WorkflowStarted { total_steps } => format!("{} total_steps={total_steps}", self.name()),
            Event::WorkflowStatus { status } => format!("{} status={status}", self.name()),
            Event::WorkflowStopped { reason } => {
                format!("{} reason={}", self.name(), reason.as_deref().unwrap_or("none"))
            }
            Event::AgentAdded { monitoring_id, parent_id, name, engine_id } => format!(
                "{} id={} parent={:?} name={name} engine={engine_id}",
                self.name(),
                monitoring_id.get(),
                (*parent_id).map(MonitoringId::get)
            ),
            Event::AgentStatus { monitoring_id, status } => {
                format!("{} id={} status={status:?}", self.name(), monitoring_id.get())
            }
            Event::AgentEngine { monitoring_id, engine_id } => {
                format!("{} id={} engine={engine_id}", self.name(), monitoring_id.get())
            }
            Event::AgentModel { monitoring_id, model } => {
                format!("{} id={} model={model}", self.name(), monitoring_id.get())
            }
            Event::AgentTelemetry { monitoring_id, telemetry } => format!(
                "{} id={} tokens_in={} tokens_out={} cost={:?}",
                self.name(),
                monitoring_id.get(),
                telemetry.tokens_in,
                telemetry.tokens_out,
                telemetry.cost
            ),
            Event::AgentReset { monitoring_id } => format!("{} id={}", self.name(), monitoring_id.get()),
            Event::ControllerInfo { monitoring_id, name } => {
                format!("{} id={} name={name}", self.name(), monitoring_id.get())
            }
            Event::ControllerEngine { monitoring_id, engine_id } => {
                format!("{} id={} engine={engine_id}", self.name(), monitoring_id.get())
            }
            Event::ControllerModel { monitoring_id, model } => {
                format!("{} id={} model={model}", self.name(), monitoring_id.get())
            }
            Event::ControllerTelemetry { monitoring_id, telemetry } => format!(
                "{} id={} tokens_in={} tokens_out={}",
                self.name(),
                monitoring_id.get(),
                telemetry.tokens_in,
                telemetry.tokens_out
            ),
            Event::ControllerStatus { monitoring_id, status } => {
                format!("{} id={} status={status:?}", self.name(), monitoring_id.get())
            }
            Event::ControllerMonitoring { monitoring_id } => format!("{} id={}", self.name(), monitoring_id.get()),
            Event::SubagentAdded { monitoring_id, parent_id, name } => format!(
                "{} id={} parent={} name={name}",
                self.name(),
                monitoring_id.get(),
                parent_id.get()
            ),
            Event::SubagentBatch { parent_id, monitoring_ids } => {
                format!("{} parent={} count={}", self.name(), parent_id.get(), monitoring_ids.len())
            }
            Event::SubagentStatus { monitoring_id, status } => {
                format!("{} id={} status={status:?}", self.name(), monitoring_id.get())
            }
            Event::SubagentClear { parent_id } => format!("{} parent={}", self.name(), parent_id.get()),
            Event::LoopState { step_index, iteration, max_iterations } => format!(
                "{} step={step_index} iteration={iteration}/{max_iterations}",
                self.name()
            ),
            Event::LoopClear { step_index } => format!("{} step={step_index}", self.name()),
            Event::CheckpointState { step_index, reason } => format!(
                "{} step={step_index} reason={}",
                self.name(),
                reason.as_deref().unwrap_or("none")
            ),
            Event::CheckpointClear { step_index } => format!("{} step={step_index}", self.name()),
            Event::InputState { active, source } => format!("{} active={active} source={source:?}", self.name()),
            Event::SeparatorAdd { step_index, label } => format!("{} step={step_index} label={label}", self.name()),
            Event::MessageLog { message } => format!("{} {message}", self.name()),
            Event::MonitoringRegister { monitoring_id, name, engine_id, parent_id } => format!(
                "{} id={} name={name} engine={engine_id} parent={:?}",
                self.name(),
                monitoring_id.get(),
                (*parent_id).map(MonitoringId::get)
            ),
            Event::Custom { kind, payload } => format!("custom kind={kind} payload={payload}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

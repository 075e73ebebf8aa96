// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Engine and UI adapters for CodeMachine: the pluggable seams the
//! engine drives to run an agent turn, log its output, and surface a
//! live view of the workflow (spec §4.6, §6.1, §6.2).

mod engine;
mod logger;
mod registry;
mod subprocess;
mod ui;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use engine::{
    AgentConfig, ChainedPromptResult, Engine, EngineError, EngineMetadata, ExecCtx, ExecResult,
    LogLine, PromptInput, TelemetryUpdate,
};
pub use logger::{strip_markers, thinking_snippet, AgentLogger, LoggerError};
pub use registry::{EngineRegistry, RegistryError};
pub use subprocess::SubprocessEngine;
pub use ui::{UiAdapter, UiAction, UiError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeEngine};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The UI Adapter Contract (spec §6.1). The terminal renderer itself is
//! out of scope; this trait is the seam the engine calls through.

use async_trait::async_trait;
use codemachine_core::Event;

/// A user action surfaced by a connected UI, published back onto the
/// process signal channel (spec §6.1 "optional callbacks ... surface
/// user actions by publishing the corresponding process signals").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Skip,
    Quit,
    CheckpointContinue,
    CheckpointQuit,
}

/// A live view onto the workflow. Multiple adapters may connect
/// simultaneously (spec §6.1).
#[async_trait]
pub trait UiAdapter: Send + Sync {
    /// Subscribe to the event bus. Called once before `start`.
    async fn connect(&self, events: tokio::sync::broadcast::Receiver<Event>);

    async fn disconnect(&self);

    async fn start(&self) -> Result<(), UiError>;

    async fn stop(&self);

    fn is_running(&self) -> bool;

    fn is_connected(&self) -> bool;

    /// Surface a user action. The default no-op means an adapter that
    /// doesn't support interactive control (e.g. a plain log tailer)
    /// need not override it.
    async fn on_action(&self, _action: UiAction) {}
}

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("adapter failed to start: {0}")]
    StartFailed(String),
}

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;

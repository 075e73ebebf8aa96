// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow-level error taxonomy (spec §7): `AbortError`, `EngineError`,
//! `ValidationError`, `PersistenceError`, `UserStop`. Evaluators and
//! providers never cross the Runner boundary with anything but `Abort` and
//! `Engine`; everything else is folded into one of these variants.

use codemachine_core::{MonitoringId, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Cooperative cancellation; not logged as a failure.
    #[error("aborted")]
    Abort {
        monitoring_id: Option<MonitoringId>,
        session_id: Option<SessionId>,
    },
    #[error(transparent)]
    Engine(#[from] codemachine_adapters::EngineError),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Persistence(#[from] codemachine_storage::StorageError),
    #[error(transparent)]
    Template(#[from] codemachine_runbook::ParseError),
    /// `workflow:stop` or a second Ctrl-C from the host.
    #[error("stopped by user")]
    UserStop,
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error should surface as `STEP_ERROR` and transition the
    /// workflow to `error`, as opposed to a cooperative stop/abort.
    pub fn is_step_error(&self) -> bool {
        matches!(self, Self::Engine(_) | Self::Validation(_))
    }
}

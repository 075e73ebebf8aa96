// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Categorized failure reasons surfaced by an [`Engine`](../trait.Engine.html)
//! implementation, so the Step Executor and UI adapters can react to a
//! category without string-matching (spec §3 Agent Run Record `status`, §7
//! `EngineError` taxonomy entry).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorized failure reasons for an engine/agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterError {
    /// Invalid API key or authentication failure.
    Unauthorized,
    /// Exceeded quota or billing issue.
    OutOfCredits,
    /// Network connectivity issue.
    NoInternet,
    /// Rate limited by the upstream API.
    RateLimited,
    /// Cooperative cancellation via `abortSignal` (spec §7 `AbortError`).
    Aborted,
    /// Other error with a free-form message.
    Other(String),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::Unauthorized => write!(f, "unauthorized"),
            AdapterError::OutOfCredits => write!(f, "out of credits"),
            AdapterError::NoInternet => write!(f, "no internet connection"),
            AdapterError::RateLimited => write!(f, "rate limited"),
            AdapterError::Aborted => write!(f, "aborted"),
            AdapterError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AdapterError {}

#[cfg(test)]
#[path = "engine_error_tests.rs"]
mod tests;

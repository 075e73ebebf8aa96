// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation shared by the Step Executor, engines, and
//! input providers (spec §5 "The Runner owns one `abortController` at a
//! time; it is cancelled on pause/skip/stop/mode-switch. Engines must
//! propagate cancellation to subprocesses.").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag an `Engine` implementation polls (or a subprocess watches) to
/// know when its run has been cancelled.
#[derive(Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "abort_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence failures (spec §7 `PersistenceError`): logged and
//! downgraded to best-effort by callers, except `mark_step_started`,
//! which must succeed or the run aborts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

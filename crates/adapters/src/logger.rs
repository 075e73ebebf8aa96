// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent Logger (spec §4.3): per-run append-only log file, shared
//! and single-writer per id (spec §5 "Shared resource policy").

use codemachine_core::MonitoringId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("agent {0} has no open log file")]
    NotOpen(u64),
    #[error("io error for agent {monitoring_id}: {source}")]
    Io {
        monitoring_id: u64,
        #[source]
        source: std::io::Error,
    },
}

struct OpenFile {
    path: PathBuf,
    file: File,
}

/// Append-only per-agent log, line-flushed. Lines may carry marker
/// tokens (`===`, `[user:...]`, ANSI color, `Thinking: <text>`) which
/// readers strip on render; this layer writes bytes verbatim.
#[derive(Default)]
pub struct AgentLogger {
    files: Mutex<HashMap<u64, OpenFile>>,
}

impl AgentLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, id: MonitoringId, log_path: &Path) -> Result<(), LoggerError> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LoggerError::Io {
                monitoring_id: id.get(),
                source: e,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| LoggerError::Io {
                monitoring_id: id.get(),
                source: e,
            })?;
        self.files.lock().insert(
            id.get(),
            OpenFile {
                path: log_path.to_path_buf(),
                file,
            },
        );
        Ok(())
    }

    pub fn write(&self, id: MonitoringId, text: &str) -> Result<(), LoggerError> {
        let mut files = self.files.lock();
        let entry = files.get_mut(&id.get()).ok_or(LoggerError::NotOpen(id.get()))?;
        writeln!(entry.file, "{text}").map_err(|e| LoggerError::Io {
            monitoring_id: id.get(),
            source: e,
        })?;
        entry.file.flush().map_err(|e| LoggerError::Io {
            monitoring_id: id.get(),
            source: e,
        })
    }

    pub fn close(&self, id: MonitoringId) {
        self.files.lock().remove(&id.get());
    }

    pub fn log_path(&self, id: MonitoringId) -> Option<PathBuf> {
        self.files.lock().get(&id.get()).map(|f| f.path.clone())
    }

    pub fn is_open(&self, id: MonitoringId) -> bool {
        self.files.lock().contains_key(&id.get())
    }
}

/// Strip an ANSI CSI escape sequence (`\x1b[...<final byte>`) from the
/// start of `line`, if one is present.
fn strip_ansi_prefix(line: &str) -> &str {
    let Some(rest) = line.strip_prefix('\x1b') else {
        return line;
    };
    let Some(rest) = rest.strip_prefix('[') else {
        return line;
    };
    match rest.find(|c: char| c.is_ascii_alphabetic()) {
        Some(end) => &rest[end + 1..],
        None => line,
    }
}

/// Strip a `[user:...]` tag from the start of `line`, if one is present.
fn strip_user_tag_prefix(line: &str) -> &str {
    if !line.starts_with("[user:") {
        return line;
    }
    match line.find(']') {
        Some(end) => &line[end + 1..],
        None => line,
    }
}

/// Strip the marker tokens a writer may prefix a line with (`===`,
/// `[user:...]`, ANSI color codes, in any combination), for plain-text
/// rendering.
pub fn strip_markers(line: &str) -> &str {
    let mut line = line;
    loop {
        let stripped = strip_ansi_prefix(line);
        let stripped = strip_user_tag_prefix(stripped);
        let stripped = stripped.strip_prefix("===").unwrap_or(stripped);
        let stripped = stripped.trim_start();
        if stripped == line {
            return stripped;
        }
        line = stripped;
    }
}

/// Extract the "latest thought" snippet from a `Thinking: <text>` line.
pub fn thinking_snippet(line: &str) -> Option<&str> {
    line.strip_prefix("Thinking: ").map(str::trim)
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON read/write helpers shared by every file under
//! `.codemachine/` (spec §4.4: "All writes are atomic (write to temp,
//! fsync, rename). All reads tolerate missing files by returning the
//! documented zero value.").

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::warn;

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_err(path: &Path, source: serde_json::Error) -> StorageError {
    StorageError::Json {
        path: path.display().to_string(),
        source,
    }
}

/// Serialize `value` to `path` via a temp file, fsync, then rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| json_err(path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| io_err(&tmp_path, e.into_error()))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Read and parse `path`, returning `None` when it doesn't exist. A
/// corrupt file is rotated to `.bak` and treated as absent so the run
/// can keep going from the documented zero value.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            let bak = path.with_extension("bak");
            warn!(
                error = %err,
                path = %path.display(),
                bak = %bak.display(),
                "corrupt state file, rotating to .bak",
            );
            fs::rename(path, &bak).map_err(|e| io_err(path, e))?;
            Ok(None)
        }
    }
}

/// Read and parse `path`, falling back to `T::default()` when absent or
/// corrupt.
pub fn read_json_or_default<T: DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, StorageError> {
    Ok(read_json_opt(path)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;

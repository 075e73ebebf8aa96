// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Engine Registry (spec §4.6): `register`, `get`, `getDefault`,
//! `getAll`. An unknown engine id on a step is a recoverable error — the
//! Step Executor falls back to the default and reports via
//! `message:log`.

use crate::engine::Engine;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no default engine registered")]
    NoDefault,
}

#[derive(Default)]
pub struct EngineRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    engines: HashMap<String, Arc<dyn Engine>>,
    default_id: Option<String>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine. The first engine registered becomes the
    /// default unless overridden by `set_default`.
    pub fn register(&self, engine: Arc<dyn Engine>) {
        let id = engine.metadata().id;
        let mut inner = self.inner.write();
        if inner.default_id.is_none() {
            inner.default_id = Some(id.clone());
        }
        inner.engines.insert(id, engine);
    }

    pub fn set_default(&self, id: impl Into<String>) {
        self.inner.write().default_id = Some(id.into());
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Engine>> {
        self.inner.read().engines.get(id).cloned()
    }

    pub fn get_default(&self) -> Result<Arc<dyn Engine>, RegistryError> {
        let inner = self.inner.read();
        let id = inner.default_id.as_ref().ok_or(RegistryError::NoDefault)?;
        inner.engines.get(id).cloned().ok_or(RegistryError::NoDefault)
    }

    pub fn get_all(&self) -> Vec<Arc<dyn Engine>> {
        self.inner.read().engines.values().cloned().collect()
    }

    /// Resolve a step's requested engine id, falling back to the default
    /// when unset or unknown (spec §4.6: "Unknown engine id in a step is
    /// a recoverable error (fall back to default, report via
    /// `message:log`)"). Returns whether a fallback occurred so the
    /// caller can emit that log message.
    pub fn resolve(&self, requested: Option<&str>) -> Result<(Arc<dyn Engine>, bool), RegistryError> {
        match requested.and_then(|id| self.get(id)) {
            Some(engine) => Ok((engine, false)),
            None => {
                let fell_back = requested.is_some();
                Ok((self.get_default()?, fell_back))
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

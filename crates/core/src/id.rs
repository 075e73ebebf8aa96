// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation and identifier types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an engine-level conversation, assigned by the
    /// engine once known and used to resume across process restarts (spec §3,
    /// "Session id").
    pub struct SessionId;
}

/// Engine-independent numeric id assigned by the core for every agent run
/// (spec §3 Agent Run Record, §8 invariant 4: monotonic per process).
///
/// Deliberately a plain integer rather than a UUID: the monotonic ordering
/// is part of the public contract (`R1.id < R2.id` iff `R1` was registered
/// first), so the registry hands these out from a single atomic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MonitoringId(pub u64);

impl MonitoringId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MonitoringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates unique identifiers.
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based ID generator for production use (used for `SessionId`-shaped
/// values returned by fake/test engines; real engines assign their own).
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Monotonic generator for [`MonitoringId`]s. Seeded at 1 per process, per
/// spec §4.2: "Ids are a monotonically increasing counter seeded at 1 per
/// process."
#[derive(Clone)]
pub struct MonitoringIdGen {
    counter: Arc<AtomicU64>,
}

impl Default for MonitoringIdGen {
    fn default() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl MonitoringIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> MonitoringId {
        MonitoringId(self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;

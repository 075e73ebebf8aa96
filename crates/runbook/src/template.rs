// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parsed template (spec §4.5 Template Loader & Model): an ordered
//! list of steps plus the `specification` flag the engine checks before
//! running.

use crate::step::Step;
use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    /// Whether the run requires `.codemachine/inputs/specifications.md`
    /// to exist before the first step runs (spec §6.4).
    #[serde(default)]
    pub specification: bool,
    #[serde(default, alias = "step", deserialize_with = "deserialize_steps")]
    pub steps: Vec<Step>,
}

/// Deserialize steps from either a sequence (TOML `[[step]]`) or a map
/// of labeled blocks (HCL `step "agent_id" { }`, order-preserving).
fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StepsVisitor;

    impl<'de> Visitor<'de> for StepsVisitor {
        type Value = Vec<Step>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a sequence of steps or a map of labeled step blocks")
        }

        fn visit_seq<S>(self, seq: S) -> Result<Vec<Step>, S::Error>
        where
            S: SeqAccess<'de>,
        {
            Vec::deserialize(de::value::SeqAccessDeserializer::new(seq))
        }

        fn visit_map<M>(self, map: M) -> Result<Vec<Step>, M::Error>
        where
            M: MapAccess<'de>,
        {
            let index_map: IndexMap<String, Step> =
                IndexMap::deserialize(de::value::MapAccessDeserializer::new(map))?;
            Ok(index_map
                .into_iter()
                .map(|(key, mut step)| {
                    if step.agent_id.is_empty() {
                        step.agent_id = key;
                    }
                    step
                })
                .collect())
        }
    }

    deserializer.deserialize_any(StepsVisitor)
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

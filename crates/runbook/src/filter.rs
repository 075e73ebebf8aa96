// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies the track/conditions filter once at run start (spec §4.5),
//! producing the ordered list the state machine iterates. Separator
//! steps always survive the filter; they're emitted to the event bus as
//! UI elements and never executed.

use crate::step::Step;
use std::collections::HashSet;

pub fn apply_filters(
    steps: &[Step],
    selected_track: Option<&str>,
    selected_conditions: &HashSet<String>,
) -> Vec<Step> {
    steps
        .iter()
        .filter(|step| step.matches_filters(selected_track, selected_conditions))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

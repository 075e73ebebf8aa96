// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::step::StepKind;

fn step(agent_id: &str, tracks: Vec<&str>, conditions: Vec<&str>) -> Step {
    Step {
        kind: StepKind::Module,
        agent_id: agent_id.to_string(),
        agent_name: agent_id.to_string(),
        prompt_path: None,
        engine_id: None,
        model: None,
        model_reasoning_effort: None,
        behavior: None,
        execute_once: false,
        interactive: false,
        tracks: tracks.into_iter().map(String::from).collect(),
        conditions: conditions.into_iter().map(String::from).collect(),
        chained_prompts: vec![],
        label: None,
    }
}

#[test]
fn no_filters_keeps_every_step_in_order() {
    let steps = vec![step("a", vec![], vec![]), step("b", vec![], vec![])];
    let filtered = apply_filters(&steps, None, &HashSet::new());
    assert_eq!(
        filtered.iter().map(|s| s.agent_id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn track_filter_drops_non_matching_steps() {
    let steps = vec![
        step("a", vec!["backend"], vec![]),
        step("b", vec!["frontend"], vec![]),
        step("c", vec![], vec![]),
    ];
    let filtered = apply_filters(&steps, Some("backend"), &HashSet::new());
    assert_eq!(
        filtered.iter().map(|s| s.agent_id.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
}

#[test]
fn condition_filter_requires_full_subset() {
    let steps = vec![
        step("a", vec![], vec!["has_tests"]),
        step("b", vec![], vec!["has_tests", "has_docs"]),
    ];
    let selected: HashSet<String> = ["has_tests".to_string()].into_iter().collect();
    let filtered = apply_filters(&steps, None, &selected);
    assert_eq!(
        filtered.iter().map(|s| s.agent_id.as_str()).collect::<Vec<_>>(),
        vec!["a"]
    );
}

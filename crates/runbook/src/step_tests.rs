// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn module_step() -> Step {
    Step {
        kind: StepKind::Module,
        agent_id: "implementer".to_string(),
        agent_name: "Implementer".to_string(),
        prompt_path: Some(PromptPath::Single("prompts/implement.md".to_string())),
        engine_id: None,
        model: None,
        model_reasoning_effort: None,
        behavior: None,
        execute_once: false,
        interactive: false,
        tracks: vec![],
        conditions: vec![],
        chained_prompts: vec![],
        label: None,
    }
}

#[test]
fn prompt_path_single_yields_one_path() {
    let pp = PromptPath::Single("a.md".to_string());
    assert_eq!(pp.paths(), vec!["a.md"]);
}

#[test]
fn prompt_path_many_yields_all_paths() {
    let pp = PromptPath::Many(vec!["a.md".to_string(), "b.md".to_string()]);
    assert_eq!(pp.paths(), vec!["a.md", "b.md"]);
}

#[parameterized(
    no_filters_always_matches = { vec![], vec![], None, vec![], true },
    empty_tracks_matches_any_selection = { vec![], vec![], Some("backend"), vec![], true },
    track_mismatch_excludes = { vec!["backend".to_string()], vec![], Some("frontend"), vec![], false },
    track_match_includes = { vec!["backend".to_string()], vec![], Some("backend"), vec![], true },
    no_selected_track_excludes_tracked_step = { vec!["backend".to_string()], vec![], None, vec![], false },
    condition_subset_matches = { vec![], vec!["has_tests".to_string()], None, vec!["has_tests".to_string()], true },
    condition_missing_excludes = { vec![], vec!["has_tests".to_string()], None, vec![], false },
)]
fn matches_filters_follows_spec_rule(
    tracks: Vec<String>,
    conditions: Vec<String>,
    selected_track: Option<&str>,
    selected_conditions: Vec<String>,
    expected: bool,
) {
    let mut step = module_step();
    step.tracks = tracks;
    step.conditions = conditions;
    let selected: HashSet<String> = selected_conditions.into_iter().collect();
    assert_eq!(step.matches_filters(selected_track, &selected), expected);
}

#[test]
fn step_roundtrips_through_json() {
    let step = module_step();
    let json = serde_json::to_string(&step).unwrap();
    let back: Step = serde_json::from_str(&json).unwrap();
    assert_eq!(step, back);
}

#[test]
fn behavior_loop_tags_as_type_field() {
    let behavior = Behavior::Loop {
        steps_back: 1,
        max_iterations: 2,
        skip_set: HashSet::new(),
    };
    let json = serde_json::to_value(&behavior).unwrap();
    assert_eq!(json["type"], "loop");
    assert_eq!(json["steps_back"], 1);
}

#[test]
fn is_separator_and_is_controller_match_kind() {
    let mut step = module_step();
    assert!(!step.is_separator());
    assert!(!step.is_controller());

    step.kind = StepKind::Separator;
    assert!(step.is_separator());

    step.kind = StepKind::Controller;
    assert!(step.is_controller());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario (a): a linear two-step run with no chained prompts and no
//! filters completes both steps and exits zero.

use super::prelude::*;

#[test]
fn linear_two_step_run_completes_and_persists_both_steps() {
    let dir = workspace_with(two_step_template());

    let mut cmd = codemachine();
    cmd.current_dir(dir.path())
        .args(fake_engine_args("done"))
        .arg("--template")
        .arg("template.toml")
        .write_stdin("\n\n");

    cmd.assert().success();

    let root = dir.path().join(".codemachine");
    let step0: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("steps/0.json")).unwrap()).unwrap();
    let step1: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("steps/1.json")).unwrap()).unwrap();

    assert!(step0["completed_at"].is_number(), "step 0 should be completed: {step0}");
    assert!(step1["completed_at"].is_number(), "step 1 should be completed: {step1}");
}

#[test]
fn a_single_step_run_with_no_further_input_stops_instead_of_completing() {
    // No stdin at all: the user provider sees EOF (InputResult::Stop) as soon
    // as step A finishes and asks for the next input.
    let dir = workspace_with(one_step_template());

    let mut cmd = codemachine();
    cmd.current_dir(dir.path())
        .args(fake_engine_args("done"))
        .arg("--template")
        .arg("template.toml")
        .write_stdin("");

    cmd.assert().failure().code(1);
}

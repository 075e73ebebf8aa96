// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario (f): skipping the current step while awaiting input advances
//! past it without marking the workflow as stopped. Also covers the
//! "no template selected" boundary from spec §8.

use super::prelude::*;

#[test]
fn skip_signal_advances_past_the_awaiting_step() {
    let dir = workspace_with(two_step_template());

    let mut cmd = codemachine();
    cmd.current_dir(dir.path())
        .args(fake_engine_args("done"))
        .arg("--template")
        .arg("template.toml")
        .write_stdin("/skip\n/skip\n");

    cmd.assert().success();

    let root = dir.path().join(".codemachine");
    let step0: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("steps/0.json")).unwrap()).unwrap();
    assert!(step0["completed_at"].is_number());
}

#[test]
fn missing_template_selection_fails_before_any_step_runs() {
    let dir = TempDir::new().unwrap();

    let mut cmd = codemachine();
    cmd.current_dir(dir.path()).args(fake_engine_args("done")).write_stdin("");

    let output = cmd.output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no template selected"), "stderr was: {stderr}");
}

#[test]
fn unknown_engine_id_on_a_step_falls_back_to_the_default_engine() {
    let dir = workspace_with(one_step_template());
    write_file(
        dir.path(),
        "template.toml",
        r#"
[[step]]
kind = "module"
agent_id = "a"
agent_name = "Agent A"
prompt_path = "prompts/a.md"
engine_id = "does-not-exist"
"#,
    );

    let mut cmd = codemachine();
    cmd.current_dir(dir.path())
        .args(fake_engine_args("done"))
        .arg("--template")
        .arg("template.toml")
        .write_stdin("/skip\n");

    cmd.assert().success();
}

use tempfile::TempDir;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario (c): a workflow whose steps already completed on disk resumes
//! on a fresh process without re-invoking the engine for those steps, and
//! without needing `--template` again (the prior selection is persisted
//! under `.codemachine/template.json`).

use super::prelude::*;

#[test]
fn a_second_process_skips_steps_already_completed_on_disk() {
    let dir = workspace_with(two_step_template());
    let counter = dir.path().join("calls");
    std::fs::write(&counter, "").unwrap();

    let engine_args = vec![
        "--engine-cmd".to_string(),
        "/bin/sh".to_string(),
        "--engine-arg".to_string(),
        "-c".to_string(),
        "--engine-arg".to_string(),
        format!("cat >/dev/null; echo x >> {}; printf done", counter.display()),
    ];

    let mut first = codemachine();
    first
        .current_dir(dir.path())
        .args(&engine_args)
        .arg("--template")
        .arg("template.toml")
        .write_stdin("\n\n");
    first.assert().success();

    let calls_after_first = std::fs::read_to_string(&counter).unwrap().lines().count();
    assert_eq!(calls_after_first, 2, "both steps should have invoked the engine once each");

    let mut second = codemachine();
    second.current_dir(dir.path()).args(&engine_args).write_stdin("");
    second.assert().success();

    let calls_after_second = std::fs::read_to_string(&counter).unwrap().lines().count();
    assert_eq!(
        calls_after_second, calls_after_first,
        "a resumed run over already-completed steps must not re-invoke the engine"
    );
}

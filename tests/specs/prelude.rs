// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the end-to-end scenario tests: a fake agent reachable
//! as a subprocess (so the real `SubprocessEngine` wiring is exercised) and
//! small helpers for writing a template/prompt tree into a temp directory.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// `--engine-cmd`/`--engine-arg` pointing at a shell one-liner that drains
/// stdin and writes a fixed response to stdout, mirroring the minimal
/// contract `SubprocessEngine` expects from a real engine process.
pub fn fake_engine_args(reply: &str) -> Vec<String> {
    vec![
        "--engine-cmd".to_string(),
        "/bin/sh".to_string(),
        "--engine-arg".to_string(),
        "-c".to_string(),
        "--engine-arg".to_string(),
        format!("cat >/dev/null; printf '%s'", reply),
    ]
}

pub fn codemachine() -> Command {
    Command::cargo_bin("codemachine").expect("codemachine binary should build")
}

pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let full = dir.join(relative);
    std::fs::create_dir_all(full.parent().expect("parent")).expect("create_dir_all");
    std::fs::write(full, content).expect("write");
}

pub fn one_step_template() -> &'static str {
    r#"
[[step]]
kind = "module"
agent_id = "a"
agent_name = "Agent A"
prompt_path = "prompts/a.md"
"#
}

pub fn two_step_template() -> &'static str {
    r#"
[[step]]
kind = "module"
agent_id = "a"
agent_name = "Agent A"
prompt_path = "prompts/a.md"

[[step]]
kind = "module"
agent_id = "b"
agent_name = "Agent B"
prompt_path = "prompts/b.md"
"#
}

pub fn workspace_with(template: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write_file(dir.path(), "template.toml", template);
    write_file(dir.path(), "prompts/a.md", "do a");
    write_file(dir.path(), "prompts/b.md", "do b");
    dir
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn paths_are_rooted_under_dot_codemachine() {
    let root = StorageRoot::new("/workspace/project");
    assert_eq!(
        root.template_path(),
        PathBuf::from("/workspace/project/.codemachine/template.json")
    );
    assert_eq!(
        root.controller_path(),
        PathBuf::from("/workspace/project/.codemachine/controller.json")
    );
    assert_eq!(
        root.directive_path(),
        PathBuf::from("/workspace/project/.codemachine/memory/directive.json")
    );
    assert_eq!(
        root.specification_path(),
        PathBuf::from("/workspace/project/.codemachine/inputs/specifications.md")
    );
}

#[test]
fn step_path_indexes_under_steps_dir() {
    let root = StorageRoot::new("/workspace/project");
    assert_eq!(
        root.step_path(3),
        PathBuf::from("/workspace/project/.codemachine/steps/3.json")
    );
}

#[test]
fn log_path_uses_monitoring_id() {
    let root = StorageRoot::new("/workspace/project");
    assert_eq!(
        root.log_path(MonitoringId(42)),
        PathBuf::from("/workspace/project/.codemachine/logs/agent-42.log")
    );
}

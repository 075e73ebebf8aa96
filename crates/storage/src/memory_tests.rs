// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use codemachine_core::DirectiveAction;
use tempfile::tempdir;

#[test]
fn missing_directive_reads_as_continue() {
    let dir = tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    let directive = read_directive(&root).unwrap();
    assert_eq!(directive.action, DirectiveAction::Continue);
}

#[test]
fn write_then_read_roundtrips() {
    let dir = tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    let directive = Directive::loop_to("step-1", "needs another pass");
    write_directive(&root, &directive).unwrap();

    let loaded = read_directive(&root).unwrap();
    assert_eq!(loaded, directive);
}

#[test]
fn reset_overwrites_to_continue() {
    let dir = tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    write_directive(&root, &Directive::checkpoint("review")).unwrap();
    reset_directive(&root).unwrap();

    let loaded = read_directive(&root).unwrap();
    assert_eq!(loaded.action, DirectiveAction::Continue);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn write_before_open_errors() {
    let logger = AgentLogger::new();
    let err = logger.write(MonitoringId(1), "hello").unwrap_err();
    assert!(matches!(err, LoggerError::NotOpen(1)));
}

#[test]
fn open_then_write_appends_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("agent-1.log");
    let logger = AgentLogger::new();
    logger.open(MonitoringId(1), &path).unwrap();
    logger.write(MonitoringId(1), "first").unwrap();
    logger.write(MonitoringId(1), "second").unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "first\nsecond\n");
}

#[test]
fn close_removes_write_capability() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("agent-1.log");
    let logger = AgentLogger::new();
    logger.open(MonitoringId(1), &path).unwrap();
    logger.close(MonitoringId(1));

    assert!(!logger.is_open(MonitoringId(1)));
    assert!(logger.write(MonitoringId(1), "late").is_err());
}

#[test]
fn separate_ids_write_to_separate_files() {
    let dir = tempdir().unwrap();
    let logger = AgentLogger::new();
    logger.open(MonitoringId(1), &dir.path().join("a.log")).unwrap();
    logger.open(MonitoringId(2), &dir.path().join("b.log")).unwrap();
    logger.write(MonitoringId(1), "for a").unwrap();
    logger.write(MonitoringId(2), "for b").unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.log")).unwrap(),
        "for a\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("b.log")).unwrap(),
        "for b\n"
    );
}

#[test]
fn strip_markers_removes_bold_prefix() {
    assert_eq!(strip_markers("=== Step started"), "Step started");
    assert_eq!(strip_markers("plain text"), "plain text");
}

#[test]
fn strip_markers_removes_user_tag_prefix() {
    assert_eq!(strip_markers("[user:alice] do the thing"), "do the thing");
}

#[test]
fn strip_markers_removes_ansi_color_prefix() {
    assert_eq!(strip_markers("\x1b[35mcolored text"), "colored text");
}

#[test]
fn strip_markers_removes_combined_prefixes_in_any_order() {
    assert_eq!(strip_markers("\x1b[35m[user:alice] === note"), "note");
    assert_eq!(strip_markers("=== [user:bob] \x1b[1mnote"), "note");
}

#[test]
fn thinking_snippet_extracts_text() {
    assert_eq!(
        thinking_snippet("Thinking: considering edge cases"),
        Some("considering edge cases")
    );
    assert_eq!(thinking_snippet("not a thought"), None);
}

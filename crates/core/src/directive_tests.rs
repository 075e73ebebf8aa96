// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn continue_has_no_reason_or_target() {
    let d = Directive::continue_();
    assert_eq!(d.action, DirectiveAction::Continue);
    assert!(d.reason.is_none());
    assert!(d.target.is_none());
}

#[test]
fn loop_to_carries_target_and_reason() {
    let d = Directive::loop_to("step-2", "tests still failing");
    assert_eq!(d.action, DirectiveAction::Loop);
    assert_eq!(d.target.as_deref(), Some("step-2"));
    assert_eq!(d.reason.as_deref(), Some("tests still failing"));
}

#[test]
fn checkpoint_has_no_target() {
    let d = Directive::checkpoint("need human review");
    assert_eq!(d.action, DirectiveAction::Checkpoint);
    assert!(d.target.is_none());
    assert_eq!(d.reason.as_deref(), Some("need human review"));
}

#[test]
fn action_serializes_lowercase() {
    let json = serde_json::to_string(&DirectiveAction::Trigger).unwrap();
    assert_eq!(json, "\"trigger\"");
}

#[test]
fn directive_roundtrips_through_json() {
    let d = Directive::trigger("step-5", "escalate");
    let json = serde_json::to_string(&d).unwrap();
    let back: Directive = serde_json::from_str(&json).unwrap();
    assert_eq!(d, back);
}

#[test]
fn continue_omits_null_fields_when_serialized() {
    let json = serde_json::to_string(&Directive::continue_()).unwrap();
    assert!(!json.contains("reason"));
    assert!(!json.contains("target"));
}

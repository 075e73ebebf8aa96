// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::FakeEngine;

#[test]
fn first_registered_engine_becomes_default() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("claude")));
    registry.register(Arc::new(FakeEngine::new("codex")));

    assert_eq!(registry.get_default().unwrap().metadata().id, "claude");
}

#[test]
fn get_returns_none_for_unknown_id() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("claude")));
    assert!(registry.get("unknown").is_none());
}

#[test]
fn get_all_returns_every_registered_engine() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("a")));
    registry.register(Arc::new(FakeEngine::new("b")));
    assert_eq!(registry.get_all().len(), 2);
}

#[test]
fn get_default_without_registration_errors() {
    let registry = EngineRegistry::new();
    assert!(matches!(registry.get_default(), Err(RegistryError::NoDefault)));
}

#[test]
fn resolve_known_id_does_not_fall_back() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("claude")));
    registry.register(Arc::new(FakeEngine::new("codex")));

    let (engine, fell_back) = registry.resolve(Some("codex")).unwrap();
    assert_eq!(engine.metadata().id, "codex");
    assert!(!fell_back);
}

#[test]
fn resolve_unknown_id_falls_back_to_default() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("claude")));

    let (engine, fell_back) = registry.resolve(Some("missing")).unwrap();
    assert_eq!(engine.metadata().id, "claude");
    assert!(fell_back);
}

#[test]
fn resolve_no_request_uses_default_without_fallback_flag() {
    let registry = EngineRegistry::new();
    registry.register(Arc::new(FakeEngine::new("claude")));

    let (engine, fell_back) = registry.resolve(None).unwrap();
    assert_eq!(engine.metadata().id, "claude");
    assert!(!fell_back);
}

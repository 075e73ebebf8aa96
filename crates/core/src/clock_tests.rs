// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_configured_value() {
    let clock = FakeClock::new(1000);
    assert_eq!(clock.epoch_ms(), 1000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(1000);
    clock.advance(500);
    assert_eq!(clock.epoch_ms(), 1500);
}

#[test]
fn fake_clock_set_overrides() {
    let clock = FakeClock::new(1000);
    clock.set(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn system_clock_returns_nonzero_epoch() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[test]
fn manual_clock_set_and_advance() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);

    clock.advance(250);
    assert_eq!(clock.now_ms(), 1_250);

    clock.set(5);
    assert_eq!(clock.now_ms(), 5);
}

#[test]
fn now_converts_to_utc() {
    let clock = ManualClock::new(1_700_000_000_123);
    let now = clock.now();
    assert_eq!(now.timestamp_millis(), 1_700_000_000_123);
}

#[test]
fn to_utc_clamps_out_of_range() {
    assert_eq!(to_utc(u64::MAX).timestamp_millis(), 0);
}

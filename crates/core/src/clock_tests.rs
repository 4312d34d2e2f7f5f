// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn system_clock_is_close_to_utc_now() {
    let clock = SystemClock;
    let delta = Utc::now() - clock.now();
    assert!(delta.num_seconds().abs() < 5);
}

#[test]
fn fake_clock_starts_at_given_instant() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let clock = FakeClock::at(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn fake_clock_can_be_advanced() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let clock = FakeClock::at(start);
    clock.advance(Duration::minutes(90));
    assert_eq!(clock.now(), start + Duration::minutes(90));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let clock1 = FakeClock::at(start);
    let clock2 = clock1.clone();
    clock2.advance(Duration::seconds(30));
    assert_eq!(clock1.now(), start + Duration::seconds(30));

    let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    clock1.set(later);
    assert_eq!(clock2.now(), later);
}

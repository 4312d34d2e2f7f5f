// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Duration, TimeZone};
use ez_core::Side;
use yare::parameterized;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

const ON: TimerKey = TimerKey::Event(Side::On);
const OFF: TimerKey = TimerKey::Event(Side::Off);

#[test]
fn timer_lifecycle() {
    let mut timers = TimerTable::new();
    let now = now();

    timers.set(ON, TimerToken(1), now + Duration::seconds(10));
    assert!(timers.has_timers());
    assert_eq!(timers.next_deadline(), Some(now + Duration::seconds(10)));

    // Not due yet
    assert!(timers.due(now + Duration::seconds(5)).is_empty());
    assert!(timers.has_timers());

    let due = timers.due(now + Duration::seconds(15));
    assert_eq!(due, vec![(ON, TimerToken(1))]);
    assert!(!timers.has_timers());
}

#[test]
fn cancel_timer() {
    let mut timers = TimerTable::new();
    let now = now();

    timers.set(ON, TimerToken(1), now + Duration::seconds(10));
    timers.cancel(ON);

    assert!(timers.due(now + Duration::seconds(15)).is_empty());
    assert_eq!(timers.next_deadline(), None);
}

#[test]
fn set_replaces_pending_timer_under_same_key() {
    let mut timers = TimerTable::new();
    let now = now();

    timers.set(OFF, TimerToken(1), now + Duration::seconds(10));
    timers.set(OFF, TimerToken(2), now + Duration::seconds(30));

    assert_eq!(timers.len(), 1);
    assert_eq!(
        timers.get(OFF),
        Some((TimerToken(2), now + Duration::seconds(30)))
    );
    assert!(timers.due(now + Duration::seconds(15)).is_empty());
}

#[test]
fn due_timers_come_back_earliest_first() {
    let mut timers = TimerTable::new();
    let now = now();

    timers.set(OFF, TimerToken(3), now + Duration::seconds(20));
    timers.set(TimerKey::Startup, TimerToken(4), now + Duration::seconds(2));
    timers.set(ON, TimerToken(5), now + Duration::seconds(10));

    let due = timers.due(now + Duration::seconds(60));
    assert_eq!(
        due,
        vec![
            (TimerKey::Startup, TimerToken(4)),
            (ON, TimerToken(5)),
            (OFF, TimerToken(3)),
        ]
    );
    assert!(timers.is_empty());
}

#[test]
fn next_deadline_is_the_earliest() {
    let mut timers = TimerTable::new();
    let now = now();

    timers.set(ON, TimerToken(1), now + Duration::hours(2));
    timers.set(OFF, TimerToken(2), now + Duration::hours(1));

    assert_eq!(timers.next_deadline(), Some(now + Duration::hours(1)));
}

#[parameterized(
    before_both = { 5, vec![], 2 },
    at_first_deadline = { 10, vec![(ON, TimerToken(1))], 1 },
    between = { 20, vec![(ON, TimerToken(1))], 1 },
    at_second_deadline = { 30, vec![(ON, TimerToken(1)), (OFF, TimerToken(2))], 0 },
)]
fn due_returns_only_expired_timers(
    after_secs: i64,
    expected: Vec<(TimerKey, TimerToken)>,
    left: usize,
) {
    let mut timers = TimerTable::new();
    let now = now();
    timers.set(ON, TimerToken(1), now + Duration::seconds(10));
    timers.set(OFF, TimerToken(2), now + Duration::seconds(30));

    assert_eq!(timers.due(now + Duration::seconds(after_secs)), expected);
    assert_eq!(timers.len(), left);
}

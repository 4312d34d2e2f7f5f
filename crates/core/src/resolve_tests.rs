// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sun::FakeSunTimes;
use chrono::{TimeZone, Timelike, Weekday};
use proptest::prelude::*;
use yare::parameterized;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn ctx(now: DateTime<Utc>) -> ResolveContext {
    ResolveContext {
        now,
        zone: Zone::utc(),
        initial: true,
        manual_basis: false,
        weekdays: WeekdayMask::all(),
        coordinates: Some((51.5, -0.12)),
        inverse_last_fire: None,
        inverse_next_fire: None,
        jitter: 0.0,
    }
}

fn resolved(spec: &EventSpec, ctx: &ResolveContext) -> DateTime<Utc> {
    resolve(spec, ctx, &FakeSunTimes::new()).unwrap().at.unwrap()
}

// 2024-01-01 is a Monday

#[parameterized(
    later_today_initial = { 6, true, utc(2024, 1, 1, 8, 0) },
    later_today_rearm = { 6, false, utc(2024, 1, 1, 8, 0) },
    passed_initial = { 12, true, utc(2024, 1, 2, 8, 0) },
    passed_rearm = { 12, false, utc(2024, 1, 2, 8, 0) },
)]
fn time_of_day_rolls_to_tomorrow_once_passed(hour: u32, initial: bool, expected: DateTime<Utc>) {
    let spec = EventSpec::time_of_day("08:00");
    let ctx = ResolveContext {
        initial,
        ..ctx(utc(2024, 1, 1, hour, 0))
    };
    assert_eq!(resolved(&spec, &ctx), expected);
}

#[test]
fn rearm_at_exact_fire_time_moves_to_next_day() {
    let spec = EventSpec::time_of_day("08:00");
    let ctx = ResolveContext {
        initial: false,
        ..ctx(utc(2024, 1, 1, 8, 0))
    };
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 2, 8, 0));
}

#[test]
fn past_due_correction_adds_exactly_one_day() {
    // 08:00 minus 33h20m lands two days back; only one day is added
    let spec = EventSpec::time_of_day("08:00").with_offset(-2000.0, false);
    let ctx = ctx(utc(2024, 1, 1, 12, 0));
    assert_eq!(resolved(&spec, &ctx), utc(2023, 12, 31, 22, 40));
}

#[test]
fn negative_offset_before_now_rolls_forward() {
    let spec = EventSpec::time_of_day("08:00").with_offset(-600.0, false);
    let ctx = ctx(utc(2024, 1, 1, 12, 0));
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 1, 22, 0));
}

#[test]
fn positive_offset_is_applied() {
    let spec = EventSpec::time_of_day("08:00").with_offset(30.0, false);
    let ctx = ctx(utc(2024, 1, 1, 6, 0));
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 1, 8, 30));
}

#[parameterized(
    low = { 0.0, utc(2024, 1, 1, 8, 0) },
    half = { 0.5, utc(2024, 1, 1, 8, 15) },
    high = { 0.9, utc(2024, 1, 1, 8, 27) },
)]
fn random_offset_scales_by_jitter(jitter: f64, expected: DateTime<Utc>) {
    let spec = EventSpec::time_of_day("08:00").with_offset(30.0, true);
    let ctx = ResolveContext {
        jitter,
        ..ctx(utc(2024, 1, 1, 6, 0))
    };
    assert_eq!(resolved(&spec, &ctx), expected);
}

#[test]
fn weekend_only_mask_skips_to_saturday() {
    let spec = EventSpec::time_of_day("08:00");
    let ctx = ResolveContext {
        weekdays: WeekdayMask::only(&[Weekday::Sat, Weekday::Sun]),
        // Wednesday
        ..ctx(utc(2024, 1, 3, 6, 0))
    };
    let at = resolved(&spec, &ctx);
    assert_eq!(at, utc(2024, 1, 6, 8, 0));
    assert_eq!(Zone::utc().weekday(at), Weekday::Sat);
}

#[test]
fn empty_mask_fails_without_looping() {
    let spec = EventSpec::time_of_day("08:00");
    let ctx = ResolveContext {
        weekdays: WeekdayMask::none(),
        ..ctx(utc(2024, 1, 3, 6, 0))
    };
    assert_eq!(
        resolve(&spec, &ctx, &FakeSunTimes::new()),
        Err(ResolveError::NoWeekdaySelected)
    );
}

#[test]
fn invalid_time_is_reported() {
    let spec = EventSpec::time_of_day("soon");
    assert_eq!(
        resolve(&spec, &ctx(utc(2024, 1, 1, 6, 0)), &FakeSunTimes::new()),
        Err(ResolveError::InvalidTimeFormat("soon".to_string()))
    );
}

#[parameterized(
    huge = { 1e12 },
    huge_negative = { -1e12 },
    beyond_century = { 36_526.0 * 24.0 * 60.0 },
    infinite = { f64::INFINITY },
    not_a_number = { f64::NAN },
)]
fn out_of_range_offset_is_reported(offset: f64) {
    let spec = EventSpec::time_of_day("08:00").with_offset(offset, false);
    assert_eq!(
        resolve(&spec, &ctx(utc(2024, 1, 1, 6, 0)), &FakeSunTimes::new()),
        Err(ResolveError::InvalidOffset(offset.to_string()))
    );
}

#[test]
fn huge_random_offset_is_reported_after_scaling() {
    let spec = EventSpec::time_of_day("08:00").with_offset(1e12, true);
    let ctx = ResolveContext {
        jitter: 0.5,
        ..ctx(utc(2024, 1, 1, 6, 0))
    };
    assert!(matches!(
        resolve(&spec, &ctx, &FakeSunTimes::new()),
        Err(ResolveError::InvalidOffset(_))
    ));
}

#[test]
fn oversized_duration_is_reported() {
    let spec = EventSpec::duration("200000000y");
    let ctx = ResolveContext {
        initial: false,
        inverse_next_fire: Some(utc(2024, 1, 1, 8, 0)),
        ..ctx(utc(2024, 1, 1, 6, 0))
    };
    assert_eq!(
        resolve(&spec, &ctx, &FakeSunTimes::new()),
        Err(ResolveError::InvalidTimeFormat("200000000y".to_string()))
    );
}

#[test]
fn manual_events_are_unscheduled() {
    let resolution = resolve(
        &EventSpec::manual(),
        &ctx(utc(2024, 1, 1, 6, 0)),
        &FakeSunTimes::new(),
    )
    .unwrap();
    assert_eq!(resolution.at, None);
}

#[test]
fn duration_chains_off_paired_next_fire() {
    let spec = EventSpec::duration("02:00:00");
    let ctx = ResolveContext {
        initial: false,
        inverse_next_fire: Some(utc(2024, 1, 1, 8, 0)),
        ..ctx(utc(2024, 1, 1, 6, 0))
    };
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 1, 10, 0));
}

#[test]
fn initial_duration_rolls_back_when_still_ahead_today() {
    // on already passed today and moved to tomorrow; off is still ahead today
    let spec = EventSpec::duration("2h");
    let ctx = ResolveContext {
        inverse_next_fire: Some(utc(2024, 1, 2, 8, 0)),
        ..ctx(utc(2024, 1, 1, 9, 0))
    };
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 1, 10, 0));
}

#[test]
fn initial_duration_keeps_candidate_when_previous_day_passed() {
    let spec = EventSpec::duration("2h");
    let ctx = ResolveContext {
        inverse_next_fire: Some(utc(2024, 1, 2, 8, 0)),
        ..ctx(utc(2024, 1, 1, 11, 0))
    };
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 2, 10, 0));
}

#[test]
fn manual_basis_chains_off_last_fire_and_ignores_weekdays() {
    let spec = EventSpec::duration("02:00:00");
    let ctx = ResolveContext {
        initial: false,
        manual_basis: true,
        weekdays: WeekdayMask::only(&[Weekday::Sat]),
        inverse_last_fire: Some(utc(2024, 1, 1, 13, 0)),
        inverse_next_fire: Some(utc(2024, 1, 2, 8, 0)),
        ..ctx(utc(2024, 1, 1, 13, 0))
    };
    assert_eq!(resolved(&spec, &ctx), utc(2024, 1, 1, 15, 0));
}

#[parameterized(
    automatic = { false },
    manual = { true },
)]
fn duration_without_basis_is_deferred(manual_basis: bool) {
    let spec = EventSpec::duration("1h");
    let ctx = ResolveContext {
        manual_basis,
        ..ctx(utc(2024, 1, 1, 6, 0))
    };
    let err = resolve(&spec, &ctx, &FakeSunTimes::new()).unwrap_err();
    assert_eq!(err, ResolveError::DependencyUnresolved);
    assert!(err.is_silent());
}

fn sun() -> FakeSunTimes {
    FakeSunTimes::new()
        .with(SunEvent::Sunrise, NaiveTime::from_hms_opt(4, 30, 0).unwrap())
        .with(SunEvent::Dawn, NaiveTime::from_hms_opt(3, 50, 0).unwrap())
}

#[test]
fn sun_event_resolves_on_reference_date() {
    let spec = EventSpec::sun("sunrise");
    let resolution = resolve(&spec, &ctx(utc(2024, 6, 1, 0, 0)), &sun()).unwrap();
    assert_eq!(resolution.at, Some(utc(2024, 6, 1, 4, 30)));
    assert_eq!(resolution.substituted, None);
}

#[test]
fn sun_rearm_looks_up_tomorrow() {
    let spec = EventSpec::sun("sunrise");
    let ctx = ResolveContext {
        initial: false,
        ..ctx(utc(2024, 6, 1, 3, 0))
    };
    let resolution = resolve(&spec, &ctx, &sun()).unwrap();
    assert_eq!(resolution.at, Some(utc(2024, 6, 2, 4, 30)));
}

#[test]
fn undefined_sun_event_falls_back_two_steps() {
    let spec = EventSpec::sun("nauticalDawn");
    let resolution = resolve(&spec, &ctx(utc(2024, 6, 1, 0, 0)), &sun()).unwrap();
    assert_eq!(resolution.at, Some(utc(2024, 6, 1, 3, 50)));
    assert_eq!(
        resolution.substituted,
        Some((SunEvent::NauticalDawn, SunEvent::Dawn))
    );
}

#[test]
fn sun_without_coordinates_fails() {
    let spec = EventSpec::sun("sunrise");
    let ctx = ResolveContext {
        coordinates: None,
        ..ctx(utc(2024, 6, 1, 0, 0))
    };
    assert_eq!(
        resolve(&spec, &ctx, &sun()),
        Err(ResolveError::MissingCoordinates)
    );
}

#[test]
fn unknown_sun_event_fails() {
    let spec = EventSpec::sun("teatime");
    assert_eq!(
        resolve(&spec, &ctx(utc(2024, 6, 1, 0, 0)), &sun()),
        Err(ResolveError::UnknownSunEvent("teatime".to_string()))
    );
}

#[test]
fn sun_unavailable_when_fallback_exhausted() {
    let spec = EventSpec::sun("sunrise");
    assert_eq!(
        resolve(&spec, &ctx(utc(2024, 6, 1, 0, 0)), &FakeSunTimes::new()),
        Err(ResolveError::SunTimeUnavailable("sunrise".to_string()))
    );
}

proptest! {
    #[test]
    fn time_of_day_keeps_wall_clock_fields(h in 0u32..24, m in 0u32..60, s in proptest::option::of(0u32..60)) {
        let expr = match s {
            Some(s) => format!("{:02}:{:02}:{:02}", h, m, s),
            None => format!("{:02}:{:02}", h, m),
        };
        let spec = EventSpec::time_of_day(expr);
        let at = resolved(&spec, &ctx(utc(2024, 1, 1, 0, 0)));
        prop_assert_eq!(at.hour(), h);
        prop_assert_eq!(at.minute(), m);
        prop_assert_eq!(at.second(), s.unwrap_or(0));
    }

    #[test]
    fn weekday_skip_never_exceeds_six_days(day in 1u32..29, bit in 0usize..7) {
        let mut bits = [false; 7];
        bits[bit] = true;
        let now = utc(2024, 2, day, 6, 0);
        let spec = EventSpec::time_of_day("08:00");
        let ctx = ResolveContext { weekdays: WeekdayMask::from_bits(bits), ..ctx(now) };
        let at = resolved(&spec, &ctx);
        prop_assert!(at > now);
        prop_assert!(at - now < Duration::days(7));
    }
}

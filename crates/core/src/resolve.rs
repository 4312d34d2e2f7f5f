// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time resolution: from an event spec to a concrete next fire instant
//!
//! Resolution is a pure function of the event spec, the reference instant and the
//! paired event's timestamps. It runs in two stages:
//!
//! 1. A kind-specific candidate (time of day, sun event, duration after the
//!    paired event, or nothing for manual events).
//! 2. A uniform finish: apply the offset, push a past-due candidate forward
//!    by exactly one day, then skip forward to an allowed weekday.

use crate::error::ResolveError;
use crate::expr::{parse_duration, parse_time_of_day, MAX_SPAN_DAYS};
use crate::spec::{EventSpec, SourceKind};
use crate::sun::{SunEvent, SunTimes};
use crate::weekday::WeekdayMask;
use crate::zone::Zone;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Inputs to a single resolution besides the event spec itself
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext {
    pub now: DateTime<Utc>,
    pub zone: Zone,
    /// First resolution after bootstrap (no same-day rollover)
    pub initial: bool,
    /// Resolving as a consequence of a manual fire of the paired event.
    ///
    /// Duration events chain off the paired event's last fire instead of
    /// its next fire, and the weekday filter is not applied.
    pub manual_basis: bool,
    pub weekdays: WeekdayMask,
    /// `(latitude, longitude)`
    pub coordinates: Option<(f64, f64)>,
    pub inverse_last_fire: Option<DateTime<Utc>>,
    pub inverse_next_fire: Option<DateTime<Utc>>,
    /// Sample in `[0, 1)` used when the offset is randomized
    pub jitter: f64,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// `None` for manual events
    pub at: Option<DateTime<Utc>>,
    /// Requested and substituted sun events when a fallback was used
    pub substituted: Option<(SunEvent, SunEvent)>,
}

impl Resolution {
    fn unscheduled() -> Self {
        Self {
            at: None,
            substituted: None,
        }
    }
}

/// Resolve the next fire instant of `spec`
pub fn resolve(
    spec: &EventSpec,
    ctx: &ResolveContext,
    sun: &dyn SunTimes,
) -> Result<Resolution, ResolveError> {
    let (candidate, substituted) = match spec.kind {
        SourceKind::Manual => return Ok(Resolution::unscheduled()),
        SourceKind::TimeOfDay => (time_of_day_candidate(spec, ctx)?, None),
        SourceKind::Sun => {
            let (at, requested, used) = sun_candidate(spec, ctx, sun)?;
            (at, (requested != used).then_some((requested, used)))
        }
        SourceKind::Duration => (duration_candidate(spec, ctx)?, None),
    };

    let mut at = apply_offset(candidate, spec, ctx.jitter)?;
    if at <= ctx.now {
        at = ctx.zone.add_days(at, 1);
    }
    if !ctx.manual_basis {
        at = skip_to_allowed_day(at, ctx.zone, &ctx.weekdays)?;
    }

    Ok(Resolution {
        at: Some(at),
        substituted,
    })
}

fn time_of_day_candidate(
    spec: &EventSpec,
    ctx: &ResolveContext,
) -> Result<DateTime<Utc>, ResolveError> {
    let time = parse_time_of_day(&spec.time)?;
    let candidate = at_local(ctx.zone, ctx.zone.date(ctx.now), time);
    if !ctx.initial && candidate <= ctx.now {
        return Ok(ctx.zone.add_days(candidate, 1));
    }
    Ok(candidate)
}

fn sun_candidate(
    spec: &EventSpec,
    ctx: &ResolveContext,
    sun: &dyn SunTimes,
) -> Result<(DateTime<Utc>, SunEvent, SunEvent), ResolveError> {
    let requested: SunEvent = spec.sun_event.parse()?;
    let (latitude, longitude) = ctx.coordinates.ok_or(ResolveError::MissingCoordinates)?;

    let mut date = ctx.zone.date(ctx.now);
    if !ctx.initial {
        date = date.succ_opt().unwrap_or(date);
    }

    let (at, used) = sun.times(date, latitude, longitude).lookup_with_fallback(requested)?;
    Ok((at, requested, used))
}

fn duration_candidate(
    spec: &EventSpec,
    ctx: &ResolveContext,
) -> Result<DateTime<Utc>, ResolveError> {
    let basis = if ctx.manual_basis {
        ctx.inverse_last_fire
    } else {
        ctx.inverse_next_fire
    };
    let basis = basis.ok_or(ResolveError::DependencyUnresolved)?;
    let candidate = basis
        .checked_add_signed(parse_duration(&spec.duration)?)
        .ok_or_else(|| ResolveError::InvalidTimeFormat(spec.duration.clone()))?;

    if ctx.initial {
        let previous = ctx.zone.add_days(candidate, -1);
        if previous > ctx.now {
            return Ok(previous);
        }
    }
    Ok(candidate)
}

/// Shift `at` by the event's offset, sampling it when randomized.
///
/// Offsets must be finite and no longer than [`MAX_SPAN_DAYS`].
pub fn apply_offset(
    at: DateTime<Utc>,
    spec: &EventSpec,
    jitter: f64,
) -> Result<DateTime<Utc>, ResolveError> {
    let invalid = || ResolveError::InvalidOffset(spec.offset.to_string());
    let minutes = if spec.random_offset {
        spec.offset * jitter
    } else {
        spec.offset
    };
    if !minutes.is_finite() || minutes.abs() > (MAX_SPAN_DAYS * 24 * 60) as f64 {
        return Err(invalid());
    }

    let offset =
        Duration::try_milliseconds((minutes * 60_000.0).round() as i64).ok_or_else(invalid)?;
    at.checked_add_signed(offset).ok_or_else(invalid)
}

/// Advance day by day until the weekday mask allows `at`.
///
/// Seven steps cover every weekday, so an exhausted loop means the mask is
/// empty.
pub fn skip_to_allowed_day(
    mut at: DateTime<Utc>,
    zone: Zone,
    weekdays: &WeekdayMask,
) -> Result<DateTime<Utc>, ResolveError> {
    for _ in 0..7 {
        if weekdays.allows(zone.weekday(at)) {
            return Ok(at);
        }
        at = zone.add_days(at, 1);
    }
    Err(ResolveError::NoWeekdaySelected)
}

// A wall time inside a daylight-saving gap moves forward by the gap.
fn at_local(zone: Zone, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = date.and_time(time);
    zone.from_local(local)
        .or_else(|| zone.from_local(local + Duration::hours(1)))
        .unwrap_or_else(|| local.and_utc())
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of time-of-day and duration expressions

use crate::error::ResolveError;
use chrono::{Duration, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

// HH:MM with optional :SS, anywhere in the text
#[allow(clippy::expect_used)]
static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?").expect("constant regex pattern is valid")
});

// H:M:S or H:M elapsed time
#[allow(clippy::expect_used)]
static CLOCK_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+):(\d+)(?::(\d+))?\s*$").expect("constant regex pattern is valid")
});

/// Parse `HH:MM[:SS]` into a wall-clock time
pub fn parse_time_of_day(expr: &str) -> Result<NaiveTime, ResolveError> {
    let invalid = || ResolveError::InvalidTimeFormat(expr.to_string());
    let caps = TIME_OF_DAY.captures(expr).ok_or_else(invalid)?;

    let field = |i: usize| -> Result<u32, ResolveError> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().map_err(|_| invalid()),
            None => Ok(0),
        }
    };

    NaiveTime::from_hms_opt(field(1)?, field(2)?, field(3)?).ok_or_else(invalid)
}

/// Longest elapsed time or offset accepted, in days
pub const MAX_SPAN_DAYS: i64 = 36_525;

/// Parse an elapsed time: `02:00:00`, `1:30`, `2h`, `1h 30m`, `90m`, `45s`.
///
/// Spans longer than [`MAX_SPAN_DAYS`] are rejected.
pub fn parse_duration(expr: &str) -> Result<Duration, ResolveError> {
    let invalid = || ResolveError::InvalidTimeFormat(expr.to_string());

    let duration = if let Some(caps) = CLOCK_DURATION.captures(expr) {
        let part = |i: usize| -> Result<i64, ResolveError> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().map_err(|_| invalid()),
                None => Ok(0),
            }
        };
        let (hours, minutes, seconds) = (part(1)?, part(2)?, part(3)?);
        let secs = hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes.checked_mul(60)?))
            .and_then(|secs| secs.checked_add(seconds))
            .ok_or_else(invalid)?;
        Duration::try_seconds(secs).ok_or_else(invalid)?
    } else {
        let std = humantime::parse_duration(expr.trim()).map_err(|_| invalid())?;
        Duration::from_std(std).map_err(|_| invalid())?
    };

    if duration > Duration::days(MAX_SPAN_DAYS) {
        return Err(invalid());
    }
    Ok(duration)
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock zone used to evaluate time-of-day and weekday rules
//!
//! All instants are kept in UTC. The zone is only consulted when a rule
//! speaks in local terms: "08:00", "Saturday", "tomorrow".

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time zone in which wall-clock rules are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Zone {
    /// The host's local zone, daylight-saving aware
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Local wall-clock reading of `instant`
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Instant for a local wall-clock reading.
    ///
    /// Ambiguous readings (clocks going back) resolve to the earlier instant;
    /// readings that do not exist (clocks going forward) yield `None`.
    pub fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Local => Local
                .from_local_datetime(&local)
                .earliest()
                .map(|t| t.with_timezone(&Utc)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .single()
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    /// Move `instant` by whole calendar days, keeping its wall-clock time
    pub fn add_days(&self, instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        let shifted = self.to_local(instant) + Duration::days(days);
        self.from_local(shifted)
            .unwrap_or_else(|| instant + Duration::days(days))
    }

    pub fn date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date()
    }

    pub fn weekday(&self, instant: DateTime<Utc>) -> Weekday {
        self.to_local(instant).weekday()
    }

    /// Format `instant` as local wall-clock text
    pub fn format(&self, instant: DateTime<Utc>, fmt: &str) -> String {
        self.to_local(instant).format(fmt).to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => write!(f, "utc"),
            Zone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "" => Ok(Zone::Local),
            "utc" | "z" => Ok(Zone::utc()),
            other => other
                .parse::<FixedOffset>()
                .map(Zone::Fixed)
                .map_err(|_| format!("unknown time zone: {}", s)),
        }
    }
}

impl TryFrom<String> for Zone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.to_string()
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod tests;

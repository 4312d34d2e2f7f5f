// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Astronomical event times
//!
//! [`SunTimes`] is the provider seam; [`SunCalc`] is the built-in
//! low-precision solar position calculator.

use crate::error::ResolveError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Named sun events, in fallback priority order (solar noon first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SunEvent {
    SolarNoon,
    GoldenHourEnd,
    GoldenHour,
    SunriseEnd,
    SunsetStart,
    Sunrise,
    Sunset,
    Dawn,
    Dusk,
    NauticalDawn,
    NauticalDusk,
    NightEnd,
    Night,
    Nadir,
}

impl SunEvent {
    pub const ALL: [SunEvent; 14] = [
        SunEvent::SolarNoon,
        SunEvent::GoldenHourEnd,
        SunEvent::GoldenHour,
        SunEvent::SunriseEnd,
        SunEvent::SunsetStart,
        SunEvent::Sunrise,
        SunEvent::Sunset,
        SunEvent::Dawn,
        SunEvent::Dusk,
        SunEvent::NauticalDawn,
        SunEvent::NauticalDusk,
        SunEvent::NightEnd,
        SunEvent::Night,
        SunEvent::Nadir,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SunEvent::SolarNoon => "solarNoon",
            SunEvent::GoldenHourEnd => "goldenHourEnd",
            SunEvent::GoldenHour => "goldenHour",
            SunEvent::SunriseEnd => "sunriseEnd",
            SunEvent::SunsetStart => "sunsetStart",
            SunEvent::Sunrise => "sunrise",
            SunEvent::Sunset => "sunset",
            SunEvent::Dawn => "dawn",
            SunEvent::Dusk => "dusk",
            SunEvent::NauticalDawn => "nauticalDawn",
            SunEvent::NauticalDusk => "nauticalDusk",
            SunEvent::NightEnd => "nightEnd",
            SunEvent::Night => "night",
            SunEvent::Nadir => "nadir",
        }
    }
}

impl fmt::Display for SunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SunEvent {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SunEvent::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ResolveError::UnknownSunEvent(s.to_string()))
    }
}

/// Sun event instants for one date and location; `None` where undefined
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SunTable {
    times: [Option<DateTime<Utc>>; 14],
}

impl SunTable {
    pub fn get(&self, event: SunEvent) -> Option<DateTime<Utc>> {
        self.times[event.index()]
    }

    pub fn set(&mut self, event: SunEvent, at: Option<DateTime<Utc>>) {
        self.times[event.index()] = at;
    }

    /// Look up `event`, stepping back toward solar noon two places at a time
    /// while it is undefined.
    ///
    /// Returns the instant and the event actually used.
    pub fn lookup_with_fallback(
        &self,
        event: SunEvent,
    ) -> Result<(DateTime<Utc>, SunEvent), ResolveError> {
        let mut index = event.index();
        loop {
            let candidate = SunEvent::ALL[index];
            if let Some(at) = self.get(candidate) {
                return Ok((at, candidate));
            }
            if index == 0 {
                return Err(ResolveError::SunTimeUnavailable(event.name().to_string()));
            }
            index = index.saturating_sub(2);
        }
    }
}

/// Provider of sun event times for a date and location
pub trait SunTimes: Send + Sync {
    fn times(&self, date: NaiveDate, latitude: f64, longitude: f64) -> SunTable;
}

/// Built-in solar calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct SunCalc;

const RAD: f64 = PI / 180.0;
const DAY_SECS: f64 = 86_400.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
const OBLIQUITY: f64 = RAD * 23.4397;

// (altitude in degrees, morning event, evening event)
const ALTITUDES: [(f64, SunEvent, SunEvent); 6] = [
    (-0.833, SunEvent::Sunrise, SunEvent::Sunset),
    (-0.3, SunEvent::SunriseEnd, SunEvent::SunsetStart),
    (-6.0, SunEvent::Dawn, SunEvent::Dusk),
    (-12.0, SunEvent::NauticalDawn, SunEvent::NauticalDusk),
    (-18.0, SunEvent::NightEnd, SunEvent::Night),
    (6.0, SunEvent::GoldenHourEnd, SunEvent::GoldenHour),
];

fn to_days(instant: DateTime<Utc>) -> f64 {
    instant.timestamp() as f64 / DAY_SECS - 0.5 + J1970 - J2000
}

fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    let secs = (j + 0.5 - J1970) * DAY_SECS;
    if !secs.is_finite() {
        return None;
    }
    Utc.timestamp_opt(secs.round() as i64, 0).single()
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let center = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    let perihelion = RAD * 102.9372;
    m + center + perihelion + PI
}

fn declination(l: f64) -> f64 {
    (l.sin() * OBLIQUITY.sin()).asin()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

fn hour_angle(h: f64, phi: f64, dec: f64) -> Option<f64> {
    let cos_w = (h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    (-1.0..=1.0).contains(&cos_w).then(|| cos_w.acos())
}

impl SunTimes for SunCalc {
    fn times(&self, date: NaiveDate, latitude: f64, longitude: f64) -> SunTable {
        let mut table = SunTable::default();
        let Some(noon) = date.and_hms_opt(12, 0, 0).map(|n| n.and_utc()) else {
            return table;
        };

        let lw = RAD * -longitude;
        let phi = RAD * latitude;
        let d = to_days(noon);
        let n = (d - J0 - lw / (2.0 * PI)).round();
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        let dec = declination(l);
        let j_noon = solar_transit_j(ds, m, l);

        table.set(SunEvent::SolarNoon, from_julian(j_noon));
        table.set(SunEvent::Nadir, from_julian(j_noon - 0.5));

        for (altitude, morning, evening) in ALTITUDES {
            let Some(w) = hour_angle(altitude * RAD, phi, dec) else {
                continue;
            };
            let j_set = solar_transit_j(approx_transit(w, lw, n), m, l);
            let j_rise = j_noon - (j_set - j_noon);
            table.set(morning, from_julian(j_rise));
            table.set(evening, from_julian(j_set));
        }

        table
    }
}

/// Sun provider with fixed UTC clock times per event, for tests
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeSunTimes {
    times: std::collections::HashMap<SunEvent, chrono::NaiveTime>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSunTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `event` at `time` (UTC) on every date
    pub fn with(mut self, event: SunEvent, time: chrono::NaiveTime) -> Self {
        self.times.insert(event, time);
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
impl SunTimes for FakeSunTimes {
    fn times(&self, date: NaiveDate, _latitude: f64, _longitude: f64) -> SunTable {
        let mut table = SunTable::default();
        for (event, time) in &self.times {
            table.set(*event, Some(date.and_time(*time).and_utc()));
        }
        table
    }
}

#[cfg(test)]
#[path = "sun_tests.rs"]
mod tests;

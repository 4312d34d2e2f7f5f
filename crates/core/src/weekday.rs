// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weekday filter for scheduled events

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Days of the week on which automatic events may fire, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeekdayMask {
    pub mon: bool,
    pub tue: bool,
    pub wed: bool,
    pub thu: bool,
    pub fri: bool,
    pub sat: bool,
    pub sun: bool,
}

impl Default for WeekdayMask {
    fn default() -> Self {
        Self::all()
    }
}

impl WeekdayMask {
    pub fn all() -> Self {
        Self::from_bits([true; 7])
    }

    pub fn none() -> Self {
        Self::from_bits([false; 7])
    }

    /// Mask allowing only the listed days
    pub fn only(days: &[Weekday]) -> Self {
        let mut mask = Self::none();
        for day in days {
            mask.set(*day, true);
        }
        mask
    }

    pub fn from_bits(bits: [bool; 7]) -> Self {
        let [mon, tue, wed, thu, fri, sat, sun] = bits;
        Self {
            mon,
            tue,
            wed,
            thu,
            fri,
            sat,
            sun,
        }
    }

    pub fn bits(&self) -> [bool; 7] {
        [
            self.mon, self.tue, self.wed, self.thu, self.fri, self.sat, self.sun,
        ]
    }

    pub fn allows(&self, day: Weekday) -> bool {
        self.bits()[day.num_days_from_monday() as usize]
    }

    /// Set one day; returns whether the mask changed
    pub fn set(&mut self, day: Weekday, allowed: bool) -> bool {
        let mut bits = self.bits();
        let slot = &mut bits[day.num_days_from_monday() as usize];
        let changed = *slot != allowed;
        *slot = allowed;
        *self = Self::from_bits(bits);
        changed
    }

    /// True when no day is selected
    pub fn is_empty(&self) -> bool {
        !self.bits().contains(&true)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending timer table

use chrono::{DateTime, Utc};
use ez_core::{TimerKey, TimerToken};
use std::collections::HashMap;

/// Wall-clock timers, at most one per key
#[derive(Debug, Default)]
pub struct TimerTable {
    timers: HashMap<TimerKey, (TimerToken, DateTime<Utc>)>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key`, replacing whatever was pending under it
    pub fn set(&mut self, key: TimerKey, token: TimerToken, at: DateTime<Utc>) {
        self.timers.insert(key, (token, at));
    }

    pub fn cancel(&mut self, key: TimerKey) {
        self.timers.remove(&key);
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<(TimerKey, TimerToken)> {
        let mut due: Vec<_> = self
            .timers
            .iter()
            .filter(|(_, (_, at))| *at <= now)
            .map(|(key, (token, at))| (*at, *token, *key))
            .collect();
        due.sort_by_key(|(at, token, _)| (*at, *token));

        for (_, _, key) in &due {
            self.timers.remove(key);
        }
        due.into_iter().map(|(_, token, key)| (key, token)).collect()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.values().map(|(_, at)| *at).min()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn get(&self, key: TimerKey) -> Option<(TimerToken, DateTime<Utc>)> {
        self.timers.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;

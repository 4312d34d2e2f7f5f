// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime state of one side of a schedule
//!
//! An [`Event`] exclusively owns its armed timer. Arming always releases the
//! previous timer first, and disarming clears the timer and the next fire
//! time together.

use crate::effect::{Effect, TimerKey, TimerToken};
use crate::spec::{EventSpec, SourceKind};
use crate::status::Shape;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the schedule an event represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    On,
    Off,
    Trigger,
}

impl Side {
    /// The paired side, if any
    pub fn inverse(self) -> Option<Side> {
        match self {
            Side::On => Some(Side::Off),
            Side::Off => Some(Side::On),
            Side::Trigger => None,
        }
    }

    /// The on/off state this side establishes when fired
    pub fn boolean_state(self) -> Option<bool> {
        match self {
            Side::On => Some(true),
            Side::Off => Some(false),
            Side::Trigger => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::On => "ON",
            Side::Off => "OFF",
            Side::Trigger => "TRIGGER",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Side::On => Shape::Dot,
            Side::Off | Side::Trigger => Shape::Ring,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::On => write!(f, "on"),
            Side::Off => write!(f, "off"),
            Side::Trigger => write!(f, "trigger"),
        }
    }
}

/// A pending single-shot timer owned by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    pub at: DateTime<Utc>,
}

/// One side of the schedule with its resolved times
#[derive(Debug, Clone)]
pub struct Event {
    pub side: Side,
    pub spec: EventSpec,
    /// Absent when unscheduled (manual, suspended, or unresolvable)
    pub next_fire: Option<DateTime<Utc>>,
    pub last_fire: Option<DateTime<Utc>>,
    timer: Option<ArmedTimer>,
}

impl Event {
    pub fn new(side: Side, spec: EventSpec) -> Self {
        Self {
            side,
            spec,
            next_fire: None,
            last_fire: None,
            timer: None,
        }
    }

    pub fn timer_key(&self) -> TimerKey {
        TimerKey::Event(self.side)
    }

    pub fn timer(&self) -> Option<ArmedTimer> {
        self.timer
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_manual(&self) -> bool {
        self.spec.kind == SourceKind::Manual
    }

    /// Arm a timer for `at`, releasing any previous one
    pub fn arm(&mut self, token: TimerToken, at: DateTime<Utc>) -> Vec<Effect> {
        let mut effects: Vec<Effect> = self.disarm().into_iter().collect();
        self.timer = Some(ArmedTimer { token, at });
        self.next_fire = Some(at);
        effects.push(Effect::SetTimer {
            key: self.timer_key(),
            token,
            at,
        });
        effects
    }

    /// Release the timer and clear the next fire time.
    ///
    /// Yields a cancel effect only when a timer was actually armed.
    pub fn disarm(&mut self) -> Option<Effect> {
        self.next_fire = None;
        self.timer.take().map(|_| Effect::CancelTimer {
            key: self.timer_key(),
        })
    }

    /// Consume the armed timer if `token` matches it.
    ///
    /// The next fire time is kept until the event is rescheduled.
    pub fn take_expired(&mut self, token: TimerToken) -> bool {
        match self.timer {
            Some(timer) if timer.token == token => {
                self.timer = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

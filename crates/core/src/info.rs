// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only snapshot answering an info query

use crate::event::Side;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Logical state of the schedule as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalState {
    On,
    Off,
    Suspended,
    /// Trigger schedules have no on/off state
    Undefined,
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogicalState::On => "on",
            LogicalState::Off => "off",
            LogicalState::Suspended => "suspended",
            LogicalState::Undefined => "undefined",
        };
        write!(f, "{}", s)
    }
}

/// Next fire time of an event, or why there is none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextFire {
    At(DateTime<Utc>),
    Suspended,
    Manual,
    /// Duration event waiting for its paired event to be scheduled
    Pending,
    /// Resolution failed
    Unscheduled,
}

impl Serialize for NextFire {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NextFire::At(at) => serializer.serialize_str(&at.to_rfc3339()),
            NextFire::Suspended => serializer.serialize_str("suspended"),
            NextFire::Manual => serializer.serialize_str("manual"),
            NextFire::Pending => serializer.serialize_str("pending"),
            NextFire::Unscheduled => serializer.serialize_str("error"),
        }
    }
}

/// Output target and next fire of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    pub side: Side,
    pub topic: String,
    pub property: String,
    pub value: String,
    pub next: NextFire,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoSnapshot {
    pub state: LogicalState,
    pub events: Vec<EventInfo>,
}

impl InfoSnapshot {
    pub fn event(&self, side: Side) -> Option<&EventInfo> {
        self.events.iter().find(|e| e.side == side)
    }
}

/// Derive the logical state.
///
/// Suspension wins; trigger schedules are undefined; otherwise the last fired
/// state, or failing that the side whose next fire comes later (the side
/// that fires next is the opposite of the current state).
pub fn logical_state(
    suspended: bool,
    paired: bool,
    tracked: Option<bool>,
    on_next: Option<DateTime<Utc>>,
    off_next: Option<DateTime<Utc>>,
) -> LogicalState {
    if suspended {
        return LogicalState::Suspended;
    }
    if !paired {
        return LogicalState::Undefined;
    }
    if let Some(on) = tracked {
        return if on { LogicalState::On } else { LogicalState::Off };
    }
    match (on_next, off_next) {
        (Some(on), Some(off)) if off < on => LogicalState::On,
        (Some(_), Some(_)) => LogicalState::Off,
        (None, Some(_)) => LogicalState::On,
        (Some(_), None) => LogicalState::Off,
        (None, None) => LogicalState::Undefined,
    }
}

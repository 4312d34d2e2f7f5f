// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects requested by the schedule state machine

use crate::event::Side;
use crate::info::InfoSnapshot;
use crate::spec::OutputSpec;
use crate::status::Status;
use crate::traced::TracedEffect;
use chrono::{DateTime, Utc};
use std::fmt;

/// Identifies a timer slot; at most one timer is pending per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// The armed timer of an on, off or trigger event
    Event(Side),
    /// The deferred catch-up firing after bootstrap
    Startup,
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKey::Event(side) => write!(f, "event:{}", side),
            TimerKey::Startup => write!(f, "startup"),
        }
    }
}

/// Generation token distinguishing a live timer from a superseded one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An event payload handed to the output collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub side: Side,
    pub output: OutputSpec,
    /// Fired by command rather than by its own timer
    pub manual: bool,
    pub at: DateTime<Utc>,
    pub info: InfoSnapshot,
}

/// Effects are side effects that the schedule requests
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arm a single-shot timer, replacing any timer under the same key
    SetTimer {
        key: TimerKey,
        token: TimerToken,
        at: DateTime<Utc>,
    },
    /// Cancel the timer under `key`, if any
    CancelTimer { key: TimerKey },
    /// Emit an event payload
    Deliver(Delivery),
    /// Publish a status projection
    Status(Status),
    /// Answer an info query
    Info(InfoSnapshot),
    /// Log a message
    Log { level: LogLevel, message: String },
}

/// Log levels for effect-based logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Effect {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Effect::Log {
            level,
            message: message.into(),
        }
    }
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Deliver(_) => "deliver",
            Effect::Status(_) => "status",
            Effect::Info(_) => "info",
            Effect::Log { .. } => "log",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::SetTimer { key, token, at } => vec![
                ("key", key.to_string()),
                ("token", token.to_string()),
                ("at", at.to_rfc3339()),
            ],
            Effect::CancelTimer { key } => vec![("key", key.to_string())],
            Effect::Deliver(delivery) => vec![
                ("side", delivery.side.to_string()),
                ("manual", delivery.manual.to_string()),
                ("topic", delivery.output.topic.clone()),
            ],
            Effect::Status(status) => vec![("text", status.text.clone())],
            Effect::Info(info) => vec![("state", info.state.to_string())],
            Effect::Log { level, .. } => vec![("level", format!("{:?}", level))],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;

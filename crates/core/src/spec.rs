// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative description of one side of a schedule

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which time source an event resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A named astronomical event
    Sun,
    /// A fixed wall-clock time
    #[default]
    TimeOfDay,
    /// A fixed elapsed time after the paired event
    Duration,
    /// Fired only by explicit command
    Manual,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Sun => "sun",
            SourceKind::TimeOfDay => "time_of_day",
            SourceKind::Duration => "duration",
            SourceKind::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" | "1" => Ok(SourceKind::Sun),
            "time_of_day" | "tod" | "time" | "2" => Ok(SourceKind::TimeOfDay),
            "duration" | "3" => Ok(SourceKind::Duration),
            "manual" | "4" => Ok(SourceKind::Manual),
            _ => Err(format!("unknown event type: {}", s)),
        }
    }
}

/// How the output value text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Bool,
    Json,
    /// Current time as epoch milliseconds; the value text is ignored
    Date,
}

/// Where the output value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// A new outbound message
    #[default]
    Msg,
    /// A flow-scoped variable
    Flow,
    /// A global variable
    Global,
}

fn default_property() -> String {
    "payload".to_string()
}

/// Output target descriptor, opaque to the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default)]
    pub topic: String,
    /// Dotted path (message) or variable name (flow/global)
    #[serde(default = "default_property")]
    pub property: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub scope: Scope,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            topic: String::new(),
            property: default_property(),
            value: String::new(),
            value_type: ValueType::default(),
            scope: Scope::default(),
        }
    }
}

/// Configuration of one event (on, off or trigger)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventSpec {
    #[serde(default)]
    pub kind: SourceKind,
    /// `HH:MM[:SS]`, used when `kind` is time of day
    #[serde(default)]
    pub time: String,
    /// Sun event name, used when `kind` is sun
    #[serde(default)]
    pub sun_event: String,
    /// Elapsed time after the paired event, used when `kind` is duration
    #[serde(default)]
    pub duration: String,
    /// Signed offset in minutes
    #[serde(default)]
    pub offset: f64,
    /// Sample the offset uniformly from `[0, offset)`
    #[serde(default)]
    pub random_offset: bool,
    /// Skip output when the on/off state would not change
    #[serde(default)]
    pub suppress_repeated: bool,
    #[serde(flatten)]
    pub output: OutputSpec,
}

impl EventSpec {
    pub fn time_of_day(time: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::TimeOfDay,
            time: time.into(),
            ..Self::default()
        }
    }

    pub fn sun(event: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Sun,
            sun_event: event.into(),
            ..Self::default()
        }
    }

    pub fn duration(duration: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Duration,
            duration: duration.into(),
            ..Self::default()
        }
    }

    pub fn manual() -> Self {
        Self {
            kind: SourceKind::Manual,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, minutes: f64, random: bool) -> Self {
        self.offset = minutes;
        self.random_offset = random;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.output.value = value.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.output.topic = topic.into();
        self
    }

    pub fn suppressing_repeats(mut self) -> Self {
        self.suppress_repeated = true;
        self
    }

    /// The expression for the active kind, for error reporting
    pub fn expression(&self) -> &str {
        match self.kind {
            SourceKind::Sun => &self.sun_event,
            SourceKind::TimeOfDay => &self.time,
            SourceKind::Duration => &self.duration,
            SourceKind::Manual => "manual",
        }
    }
}

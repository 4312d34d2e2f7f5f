// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status projection for display
//!
//! [`project`] is a pure function of a [`StatusContext`]; the schedule
//! builds the context and never formats text itself.

use crate::event::Side;
use crate::zone::Zone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Severity colour of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    Red,
    Green,
    Yellow,
    Blue,
    Grey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Dot,
    Ring,
}

/// A status signal: severity, shape hint and text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub fill: Fill,
    pub shape: Shape,
    pub text: String,
}

impl Status {
    pub fn new(fill: Fill, shape: Shape, text: impl Into<String>) -> Self {
        Self {
            fill,
            shape,
            text: text.into(),
        }
    }
}

/// What the schedule wants to show
#[derive(Debug, Clone, PartialEq)]
pub enum StatusContext {
    /// An event just fired
    Fired {
        side: Side,
        manual: bool,
        suspended: bool,
        /// The instant the display should point at: the paired event's next
        /// fire, or the event's own next fire for a trigger
        upcoming: Option<DateTime<Utc>>,
    },
    /// Timers were armed; next fire per side
    Scheduled {
        upcoming: Vec<(Side, DateTime<Utc>)>,
    },
    Suspended { no_weekdays: bool },
    /// Resolution failed for an event
    Error { side: Side, reason: String },
    /// An inbound command was rejected
    Rejected { reason: String },
}

/// Project a context into a status
pub fn project(ctx: &StatusContext, zone: Zone) -> Status {
    let fmt = |at: DateTime<Utc>| zone.format(at, TIME_FORMAT);

    match ctx {
        StatusContext::Fired {
            side,
            manual,
            suspended,
            upcoming,
        } => {
            let fill = if *manual { Fill::Blue } else { Fill::Green };
            let text = match (side, upcoming) {
                (Side::Trigger, Some(at)) => format!("trigger @ {}", fmt(*at)),
                (Side::Trigger, None) => "trigger".to_string(),
                (_, upcoming) => {
                    let mode = if *manual { "manual" } else { "auto" };
                    match upcoming {
                        _ if *suspended => {
                            format!("{} {} - scheduling suspended", side.label(), mode)
                        }
                        Some(at) => format!("{} {} until {}", side.label(), mode, fmt(*at)),
                        None => format!("{} {}", side.label(), mode),
                    }
                }
            };
            Status::new(fill, side.shape(), text)
        }
        StatusContext::Scheduled { upcoming } if upcoming.is_empty() => {
            Status::new(Fill::Blue, Shape::Ring, "Manual mode")
        }
        StatusContext::Scheduled { upcoming } => {
            let mut upcoming = upcoming.clone();
            upcoming.sort_by_key(|(_, at)| *at);
            let text = upcoming
                .iter()
                .map(|(side, at)| format!("{} @ {}", side.label(), fmt(*at)))
                .collect::<Vec<_>>()
                .join(", ");
            Status::new(Fill::Yellow, Shape::Dot, text)
        }
        StatusContext::Suspended { no_weekdays } => {
            let text = if *no_weekdays {
                "Scheduling suspended (no weekdays selected)"
            } else {
                "Scheduling suspended"
            };
            Status::new(Fill::Grey, Shape::Dot, text)
        }
        StatusContext::Error { side, reason } => {
            Status::new(Fill::Red, Shape::Dot, format!("{}: {}", side.label(), reason))
        }
        StatusContext::Rejected { reason } => Status::new(Fill::Red, Shape::Ring, reason.clone()),
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

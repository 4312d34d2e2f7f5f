// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ez-core: Core library for the ez recurring timer
//!
//! This crate provides:
//! - Time resolution for time-of-day, sun, duration and manual events
//! - A pure schedule state machine driven by effects
//! - Status projection, info snapshots and command parsing
//! - Clock, sun and jitter abstractions for deterministic tests

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod jitter;
pub mod sun;
pub mod zone;

pub mod error;
pub mod expr;
pub mod weekday;

// Data model and state machine (order matters for dependencies)
pub mod spec;
pub mod event;
pub mod effect;
pub mod traced;
pub mod resolve;
pub mod status;
pub mod info;
pub mod config;
pub mod field;
pub mod command;
pub mod schedule;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{Command, FieldUpdate};
pub use config::{ConfigError, TimerConfig, TimerType};
pub use effect::{Delivery, Effect, LogLevel, TimerKey, TimerToken};
pub use error::{CommandError, ResolveError};
pub use event::{Event, Side};
pub use info::{EventInfo, InfoSnapshot, LogicalState, NextFire};
pub use jitter::{FixedJitter, Jitter, ThreadRngJitter};
pub use schedule::{Outcome, ResolveEnv, Schedule, ScheduleConfig};
pub use spec::{EventSpec, OutputSpec, Scope, SourceKind, ValueType};
pub use status::{Fill, Shape, Status, StatusContext};
pub use sun::{SunCalc, SunEvent, SunTable, SunTimes};
#[cfg(any(test, feature = "test-support"))]
pub use sun::FakeSunTimes;
pub use traced::TracedEffect;
pub use weekday::WeekdayMask;
pub use zone::Zone;

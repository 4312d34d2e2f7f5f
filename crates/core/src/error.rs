// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for resolution and command dispatch

use thiserror::Error;

/// Reasons an event's next fire time could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid time: {0}")]
    InvalidTimeFormat(String),
    #[error("Invalid offset: {0} minutes")]
    InvalidOffset(String),
    #[error("Unknown sun event: {0}")]
    UnknownSunEvent(String),
    #[error("Sun time unavailable: {0}")]
    SunTimeUnavailable(String),
    /// Duration event waiting on its paired event; not a user-facing error
    #[error("waiting for paired event")]
    DependencyUnresolved,
    #[error("Latitude/longitude required for sun events")]
    MissingCoordinates,
    #[error("No weekdays selected")]
    NoWeekdaySelected,
}

impl ResolveError {
    /// Whether this failure should stay out of the status display
    pub fn is_silent(&self) -> bool {
        matches!(self, ResolveError::DependencyUnresolved)
    }
}

/// Errors from interpreting an inbound command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unsupported input")]
    UnsupportedCommand(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("{0} not available for this timer type")]
    NotApplicable(String),
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer configuration
//!
//! One file configures one schedule instance: either an on/off pair or a
//! single trigger.

use crate::spec::EventSpec;
use crate::weekday::WeekdayMask;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing [{0}] event for this timer type")]
    MissingEvent(&'static str),
    #[error("[{0}] event not allowed for this timer type")]
    UnexpectedEvent(&'static str),
    #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Whether the schedule is an on/off pair or a single trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerType {
    #[default]
    OnOff,
    Trigger,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    #[serde(default)]
    pub timer_type: TimerType,
    #[serde(default)]
    pub timezone: Zone,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub suspended: bool,
    /// Re-emit the current state's payload shortly after bootstrap
    #[serde(default)]
    pub startup_message: bool,
    /// Emit the off payload when scheduling becomes suspended
    #[serde(default)]
    pub send_events_on_suspend: bool,
    #[serde(default)]
    pub weekdays: WeekdayMask,
    #[serde(default)]
    pub on: Option<EventSpec>,
    #[serde(default)]
    pub off: Option<EventSpec>,
    #[serde(default)]
    pub trigger: Option<EventSpec>,
}

impl TimerConfig {
    pub fn on_off(on: EventSpec, off: EventSpec) -> Self {
        Self {
            timer_type: TimerType::OnOff,
            on: Some(on),
            off: Some(off),
            ..Self::default()
        }
    }

    pub fn trigger(trigger: EventSpec) -> Self {
        Self {
            timer_type: TimerType::Trigger,
            trigger: Some(trigger),
            ..Self::default()
        }
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.timezone = zone;
        self
    }

    pub fn with_weekdays(mut self, weekdays: WeekdayMask) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_startup_message(mut self) -> Self {
        self.startup_message = true;
        self
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TimerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Check the event tables match the timer type and coordinates are sane.
    ///
    /// Sun events without coordinates are allowed here; they surface as a
    /// status error at bootstrap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.timer_type {
            TimerType::OnOff => {
                if self.on.is_none() {
                    return Err(ConfigError::MissingEvent("on"));
                }
                if self.off.is_none() {
                    return Err(ConfigError::MissingEvent("off"));
                }
                if self.trigger.is_some() {
                    return Err(ConfigError::UnexpectedEvent("trigger"));
                }
            }
            TimerType::Trigger => {
                if self.trigger.is_none() {
                    return Err(ConfigError::MissingEvent("trigger"));
                }
                if self.on.is_some() {
                    return Err(ConfigError::UnexpectedEvent("on"));
                }
                if self.off.is_some() {
                    return Err(ConfigError::UnexpectedEvent("off"));
                }
            }
        }

        if let Some((latitude, longitude)) = self.coordinates() {
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err(ConfigError::InvalidCoordinates {
                    latitude,
                    longitude,
                });
            }
        }
        Ok(())
    }

    /// `(latitude, longitude)` when both are set
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;

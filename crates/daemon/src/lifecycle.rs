// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, input, timers, shutdown.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use ez_adapters::{StdoutAdapter, TracedOutputAdapter};
use ez_core::{ConfigError, SunCalc, SystemClock, ThreadRngJitter, TimerConfig};
use ez_engine::{Runtime, RuntimeDeps, RuntimeError};
use thiserror::Error;
use tracing::{debug, info};

use crate::protocol;

/// Upper bound on a single timer wait, so wall-clock changes are noticed
pub const MAX_WAIT: Duration = Duration::from_secs(60);

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime =
    Runtime<TracedOutputAdapter<StdoutAdapter>, SystemClock, SunCalc, ThreadRngJitter>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the timer configuration file
    pub config_path: PathBuf,
    /// Path to daemon log file; stderr when absent
    pub log_path: Option<PathBuf>,
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    pub runtime: DaemonRuntime,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// Handle one line read from stdin
    pub async fn handle_line(&mut self, line: &str) -> Result<(), LifecycleError> {
        let Some(input) = protocol::decode_line(line) else {
            return Ok(());
        };
        self.runtime.handle_input(&input).await?;
        Ok(())
    }

    /// Fire timers whose deadline has passed
    pub async fn check_timers(&mut self) -> Result<(), LifecycleError> {
        let fired = self.runtime.poll().await?;
        if fired > 0 {
            debug!(fired, "timers handled");
        }
        Ok(())
    }

    /// How long to sleep before the next timer check
    pub fn next_wait(&self) -> Duration {
        let Some(deadline) = self.runtime.next_deadline() else {
            return MAX_WAIT;
        };
        (deadline - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
            .min(MAX_WAIT)
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");
        self.runtime.shutdown().await?;
        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log path: {0}")]
    InvalidLogPath(PathBuf),
}

/// Load the timer configuration and start its schedule
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    let timer = TimerConfig::load(&config.config_path)?;
    timer.validate()?;

    info!(
        config = %config.config_path.display(),
        timer_type = ?timer.timer_type,
        "Loaded timer configuration"
    );

    let mut runtime = Runtime::new(
        RuntimeDeps {
            output: TracedOutputAdapter::new(StdoutAdapter::stdout()),
            clock: SystemClock,
            sun: SunCalc,
            jitter: ThreadRngJitter,
        },
        timer,
    );
    runtime.start().await?;

    Ok(DaemonState {
        config: config.clone(),
        runtime,
        start_time: Instant::now(),
    })
}

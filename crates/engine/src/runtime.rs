// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime driving one schedule

use crate::{error::RuntimeError, Executor, TimerTable};
use chrono::{DateTime, Utc};
use ez_adapters::OutputAdapter;
use ez_core::{Clock, Effect, Jitter, ResolveEnv, Schedule, SunTimes, TimerConfig};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Runtime collaborators
pub struct RuntimeDeps<O, C, S, J> {
    pub output: O,
    pub clock: C,
    pub sun: S,
    pub jitter: J,
}

/// Owns a schedule and carries out the effects it requests.
///
/// Every entry point takes `&mut self`, so inbound commands and timer
/// expiries are handled one at a time.
pub struct Runtime<O, C: Clock, S: SunTimes, J: Jitter> {
    executor: Executor<O>,
    timers: Arc<Mutex<TimerTable>>,
    schedule: Schedule,
    clock: C,
    sun: S,
    jitter: J,
}

impl<O, C, S, J> Runtime<O, C, S, J>
where
    O: OutputAdapter,
    C: Clock,
    S: SunTimes,
    J: Jitter,
{
    pub fn new(deps: RuntimeDeps<O, C, S, J>, config: TimerConfig) -> Self {
        let timers = Arc::new(Mutex::new(TimerTable::new()));
        Self {
            executor: Executor::new(deps.output, Arc::clone(&timers)),
            timers,
            schedule: Schedule::new(config),
            clock: deps.clock,
            sun: deps.sun,
            jitter: deps.jitter,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn output(&self) -> &O {
        self.executor.output()
    }

    /// Resolve and arm the initial timers
    pub async fn start(&mut self) -> Result<(), RuntimeError> {
        tracing::info!(
            timer_type = ?self.schedule.config().timer_type,
            suspended = self.schedule.is_suspended(),
            "starting schedule"
        );
        let env = ResolveEnv {
            now: self.clock.now(),
            sun: &self.sun,
            jitter: &self.jitter,
        };
        let effects = self.schedule.bootstrap(env);
        self.run(effects).await
    }

    /// Handle one inbound command
    pub async fn handle_input(&mut self, input: &Value) -> Result<(), RuntimeError> {
        tracing::debug!(%input, "input");
        let env = ResolveEnv {
            now: self.clock.now(),
            sun: &self.sun,
            jitter: &self.jitter,
        };
        let effects = self.schedule.dispatch(input, env);
        self.run(effects).await
    }

    /// Fire every timer due at the current instant.
    ///
    /// Returns the number of expiries handed to the schedule.
    pub async fn poll(&mut self) -> Result<usize, RuntimeError> {
        let now = self.clock.now();
        let due = self
            .timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .due(now);

        let count = due.len();
        for (key, token) in due {
            tracing::info!(%key, %token, "timer fired");
            let env = ResolveEnv {
                now,
                sun: &self.sun,
                jitter: &self.jitter,
            };
            let effects = self.schedule.timer_fired(key, token, env);
            self.run(effects).await?;
        }
        Ok(count)
    }

    /// Instant the next pending timer expires
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .next_deadline()
    }

    /// Release all timers; no output is produced
    pub async fn shutdown(&mut self) -> Result<(), RuntimeError> {
        tracing::info!("shutting down schedule");
        let effects = self.schedule.shutdown();
        self.run(effects).await
    }

    async fn run(&self, effects: Vec<Effect>) -> Result<(), RuntimeError> {
        self.executor.execute_all(effects).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;

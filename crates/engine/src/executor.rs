// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::TimerTable;
use ez_adapters::{OutputAdapter, OutputError};
use ez_core::{Effect, LogLevel};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::Instrument;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Executes effects against the output adapter and the timer table
pub struct Executor<O> {
    output: O,
    timers: Arc<Mutex<TimerTable>>,
}

impl<O> Executor<O>
where
    O: OutputAdapter,
{
    pub fn new(output: O, timers: Arc<Mutex<TimerTable>>) -> Self {
        Self { output, timers }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn timers(&self) -> Arc<Mutex<TimerTable>> {
        Arc::clone(&self.timers)
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<(), ExecuteError> {
        use ez_core::TracedEffect;

        let span = tracing::info_span!("effect", effect = effect.name());

        async move {
            tracing::debug!(fields = ?effect.fields(), "executing");

            let start = std::time::Instant::now();
            let result = self.execute_inner(effect).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "completed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Execute effects in order.
    ///
    /// A failing effect does not stop the ones after it; the first error
    /// is returned once all have run.
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<(), ExecuteError> {
        let mut first_error = None;
        for effect in effects {
            if let Err(e) = self.execute(effect).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn execute_inner(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            Effect::SetTimer { key, token, at } => {
                self.timers
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .set(key, token, at);
            }

            Effect::CancelTimer { key } => {
                self.timers
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .cancel(key);
            }

            Effect::Deliver(delivery) => self.output.deliver(&delivery).await?,

            Effect::Status(status) => self.output.status(&status).await?,

            Effect::Info(info) => self.output.info(&info).await?,

            Effect::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

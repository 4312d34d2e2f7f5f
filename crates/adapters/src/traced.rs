// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::output::{OutputAdapter, OutputError};
use async_trait::async_trait;
use ez_core::{Delivery, InfoSnapshot, Status};

/// Wrapper that adds tracing to any OutputAdapter
#[derive(Clone)]
pub struct TracedOutputAdapter<O> {
    inner: O,
}

impl<O> TracedOutputAdapter<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: OutputAdapter> OutputAdapter for TracedOutputAdapter<O> {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), OutputError> {
        let span = tracing::info_span!(
            "output.deliver",
            side = %delivery.side,
            manual = delivery.manual,
        );
        let _guard = span.enter();

        tracing::info!(
            topic = %delivery.output.topic,
            property = %delivery.output.property,
            scope = ?delivery.output.scope,
            "delivering"
        );

        let start = std::time::Instant::now();
        let result = self.inner.deliver(delivery).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "delivered"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "delivery failed"
            ),
        }

        result
    }

    async fn status(&self, status: &Status) -> Result<(), OutputError> {
        let span = tracing::info_span!("output.status", fill = ?status.fill);
        let _guard = span.enter();

        tracing::info!(text = %status.text, "status");
        let result = self.inner.status(status).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "status failed");
        }
        result
    }

    async fn info(&self, info: &InfoSnapshot) -> Result<(), OutputError> {
        let result = self.inner.info(info).await;
        tracing::debug!(state = %info.state, ok = result.is_ok(), "info answered");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

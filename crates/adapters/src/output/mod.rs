// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output adapters: where fired payloads, status and info go

mod message;
mod noop;
mod stdout;
mod variables;

pub use message::{convert_value, render, Rendered};
pub use noop::NoOpOutputAdapter;
pub use stdout::StdoutAdapter;
pub use variables::Variables;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeOutputAdapter, OutputCall};

use async_trait::async_trait;
use ez_core::{Delivery, InfoSnapshot, Status};
use thiserror::Error;

/// Errors from output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Adapter receiving everything the schedule publishes
#[async_trait]
pub trait OutputAdapter: Clone + Send + Sync + 'static {
    /// Deliver a fired event's payload
    async fn deliver(&self, delivery: &Delivery) -> Result<(), OutputError>;

    /// Publish a status update
    async fn status(&self, status: &Status) -> Result<(), OutputError>;

    /// Answer an info query
    async fn info(&self, info: &InfoSnapshot) -> Result<(), OutputError>;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op output adapter

use super::{OutputAdapter, OutputError};
use async_trait::async_trait;
use ez_core::{Delivery, InfoSnapshot, Status};

/// Output adapter that discards everything.
///
/// Useful for dry runs where only the logs matter.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpOutputAdapter;

impl NoOpOutputAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputAdapter for NoOpOutputAdapter {
    async fn deliver(&self, _delivery: &Delivery) -> Result<(), OutputError> {
        Ok(())
    }

    async fn status(&self, _status: &Status) -> Result<(), OutputError> {
        Ok(())
    }

    async fn info(&self, _info: &InfoSnapshot) -> Result<(), OutputError> {
        Ok(())
    }
}

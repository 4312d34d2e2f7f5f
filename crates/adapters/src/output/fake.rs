// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake output adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{OutputAdapter, OutputError};
use async_trait::async_trait;
use ez_core::{Delivery, InfoSnapshot, Status};
use std::sync::{Arc, Mutex};

/// Recorded output call
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Deliver(Delivery),
    Status(Status),
    Info(InfoSnapshot),
}

/// Fake output adapter for testing
#[derive(Clone, Default)]
pub struct FakeOutputAdapter {
    calls: Arc<Mutex<Vec<OutputCall>>>,
}

impl FakeOutputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OutputCall::Deliver(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OutputCall::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn record(&self, call: OutputCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl OutputAdapter for FakeOutputAdapter {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), OutputError> {
        self.record(OutputCall::Deliver(delivery.clone()));
        Ok(())
    }

    async fn status(&self, status: &Status) -> Result<(), OutputError> {
        self.record(OutputCall::Status(status.clone()));
        Ok(())
    }

    async fn info(&self, info: &InfoSnapshot) -> Result<(), OutputError> {
        self.record(OutputCall::Info(info.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

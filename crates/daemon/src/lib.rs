// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Host runtime for a single schedule
//!
//! Reads commands from stdin, writes outputs, status and info as JSON
//! lines to stdout, and sleeps between timer deadlines.

pub mod lifecycle;
pub mod protocol;

pub use lifecycle::{startup, Config, DaemonRuntime, DaemonState, LifecycleError};

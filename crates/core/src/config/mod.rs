// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod timer;

pub use timer::{ConfigError, TimerConfig, TimerType};

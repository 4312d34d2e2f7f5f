// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Random offset sampling

use rand::Rng;

/// Source of uniform samples in `[0, 1)` for randomized offsets
pub trait Jitter: Send + Sync {
    fn sample(&self) -> f64;
}

/// Thread-local RNG for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngJitter;

impl Jitter for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same sample, for tests
#[derive(Clone, Copy, Debug)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

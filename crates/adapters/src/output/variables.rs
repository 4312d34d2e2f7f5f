// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory flow and global variable scopes

use ez_core::Scope;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Named variables shared by clones of the owning adapter
#[derive(Clone, Debug, Default)]
pub struct Variables {
    values: Arc<Mutex<HashMap<(Scope, String), Value>>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, scope: Scope, name: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((scope, name.to_string()), value);
    }

    pub fn get(&self, scope: Scope, name: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(scope, name.to_string()))
            .cloned()
    }
}

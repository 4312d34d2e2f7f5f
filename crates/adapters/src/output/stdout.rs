// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines output adapter
//!
//! Every message, status and info snapshot is written as one JSON object
//! per line, tagged by `kind`. Variable-scoped deliveries update the
//! in-memory scopes instead of producing a line.

use super::message::{render, Rendered};
use super::{OutputAdapter, OutputError, Variables};
use async_trait::async_trait;
use ez_core::{Delivery, InfoSnapshot, Side, Status};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Line<'a> {
    Output {
        side: Side,
        manual: bool,
        message: Value,
        info: &'a InfoSnapshot,
    },
    Status(&'a Status),
    Info(&'a InfoSnapshot),
}

/// Writes JSON lines to a shared writer (stdout by default)
#[derive(Clone)]
pub struct StdoutAdapter {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    variables: Variables,
}

impl StdoutAdapter {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            variables: Variables::new(),
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    fn write_line(&self, line: &Line<'_>) -> Result<(), OutputError> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        serde_json::to_writer(&mut *writer, line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl OutputAdapter for StdoutAdapter {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), OutputError> {
        let (rendered, warning) = render(delivery);
        if let Some(warning) = warning {
            tracing::warn!(side = %delivery.side, "{}", warning);
        }

        match rendered {
            Rendered::Message(message) => self.write_line(&Line::Output {
                side: delivery.side,
                manual: delivery.manual,
                message,
                info: &delivery.info,
            }),
            Rendered::Variable { scope, name, value } => {
                tracing::debug!(?scope, name = %name, %value, "variable set");
                self.variables.set(scope, &name, value);
                Ok(())
            }
        }
    }

    async fn status(&self, status: &Status) -> Result<(), OutputError> {
        self.write_line(&Line::Status(status))
    }

    async fn info(&self, info: &InfoSnapshot) -> Result<(), OutputError> {
        self.write_line(&Line::Info(info))
    }
}

#[cfg(test)]
#[path = "stdout_tests.rs"]
mod tests;

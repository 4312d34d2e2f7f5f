// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound command parsing
//!
//! Commands arrive as JSON values. Strings carry a keyword (`on`, `off`,
//! `trigger`, `cancel`, `info`, `sync`) or `<field> <value>` pairs. Objects
//! carry `action`, `manual`, or programmable field names.

use crate::error::CommandError;
use crate::event::Side;
use crate::field::{lookup, FieldDef, FieldValue};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub def: &'static FieldDef,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fire an event's payload now
    Fire(Side),
    /// Drop the current cycle and re-derive the schedule
    Cancel,
    Info,
    /// Re-emit the payload of the current state
    Sync,
    Update(Vec<FieldUpdate>),
}

/// Parse an inbound message
pub fn parse(input: &Value) -> Result<Command, CommandError> {
    match input {
        Value::String(text) => parse_text(text),
        Value::Object(map) => parse_object(map),
        other => Err(unsupported(other.to_string())),
    }
}

fn unsupported(input: impl Into<String>) -> CommandError {
    CommandError::UnsupportedCommand(input.into())
}

fn keyword(word: &str) -> Option<Command> {
    match word.trim().to_ascii_lowercase().as_str() {
        "on" => Some(Command::Fire(Side::On)),
        "off" => Some(Command::Fire(Side::Off)),
        "trigger" => Some(Command::Fire(Side::Trigger)),
        "cancel" => Some(Command::Cancel),
        "info" => Some(Command::Info),
        "sync" => Some(Command::Sync),
        _ => None,
    }
}

fn parse_text(text: &str) -> Result<Command, CommandError> {
    if let Some(command) = keyword(text) {
        return Ok(command);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 2 != 0 {
        return Err(unsupported(text));
    }

    let mut updates = Vec::new();
    for pair in tokens.chunks(2) {
        let def = lookup(pair[0]).ok_or_else(|| unsupported(text))?;
        let value = def.parse(&Value::String(pair[1].to_string()))?;
        updates.push(FieldUpdate { def, value });
    }
    Ok(Command::Update(updates))
}

fn parse_object(map: &Map<String, Value>) -> Result<Command, CommandError> {
    if let Some(action) = map.get("action") {
        return action
            .as_str()
            .and_then(keyword)
            .ok_or_else(|| unsupported(action.to_string()));
    }

    if let Some(manual) = map.get("manual") {
        return match manual.as_str().and_then(keyword) {
            Some(command @ Command::Fire(_)) => Ok(command),
            _ => Err(unsupported(manual.to_string())),
        };
    }

    // Unrelated keys ride along on most messages; only registry names count.
    let mut updates = Vec::new();
    for (name, raw) in map {
        if let Some(def) = lookup(name) {
            updates.push(FieldUpdate {
                def,
                value: def.parse(raw)?,
            });
        }
    }
    if updates.is_empty() {
        return Err(unsupported(Value::Object(map.clone()).to_string()));
    }
    Ok(Command::Update(updates))
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;

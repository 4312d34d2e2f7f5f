// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload construction from an output descriptor

use chrono::{DateTime, Utc};
use ez_core::{Delivery, OutputSpec, Scope, ValueType};
use serde_json::{Map, Value};

/// What a delivery turns into
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// A new message object
    Message(Value),
    /// A write to a flow or global variable
    Variable {
        scope: Scope,
        name: String,
        value: Value,
    },
}

/// Render a delivery.
///
/// Conversion failures fall back to the raw text; the second element then
/// carries a warning.
pub fn render(delivery: &Delivery) -> (Rendered, Option<String>) {
    let output = &delivery.output;
    let (value, warning) = convert_value(&output.value, output.value_type, delivery.at);

    let rendered = match output.scope {
        Scope::Msg => Rendered::Message(build_message(output, value)),
        scope => Rendered::Variable {
            scope,
            name: output.property.clone(),
            value,
        },
    };
    (rendered, warning)
}

/// Interpret `text` per `value_type`
pub fn convert_value(
    text: &str,
    value_type: ValueType,
    now: DateTime<Utc>,
) -> (Value, Option<String>) {
    let fallback = |kind: &str| {
        (
            Value::String(text.to_string()),
            Some(format!("value {:?} is not valid {}, sending as text", text, kind)),
        )
    };

    match value_type {
        ValueType::String => (Value::String(text.to_string()), None),
        ValueType::Number => {
            let trimmed = text.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return (Value::from(n), None);
            }
            match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(n) => (Value::Number(n), None),
                None => fallback("number"),
            }
        }
        ValueType::Bool => match text.trim().to_ascii_lowercase().as_str() {
            "true" => (Value::Bool(true), None),
            "false" => (Value::Bool(false), None),
            _ => fallback("bool"),
        },
        ValueType::Json => match serde_json::from_str(text) {
            Ok(value) => (value, None),
            Err(_) => fallback("json"),
        },
        ValueType::Date => (Value::from(now.timestamp_millis()), None),
    }
}

/// Place `value` at the dotted property path of a fresh message
fn build_message(output: &OutputSpec, value: Value) -> Value {
    let mut message = Map::new();
    if !output.topic.is_empty() {
        message.insert("topic".to_string(), Value::String(output.topic.clone()));
    }

    let segments: Vec<&str> = output
        .property
        .split('.')
        .filter(|s| !s.is_empty())
        .collect();
    let Some((first, rest)) = segments.split_first() else {
        message.insert("payload".to_string(), value);
        return Value::Object(message);
    };

    let mut nested = value;
    for segment in rest.iter().rev() {
        let mut parent = Map::new();
        parent.insert(segment.to_string(), nested);
        nested = Value::Object(parent);
    }
    message.insert(first.to_string(), nested);
    Value::Object(message)
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

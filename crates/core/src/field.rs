// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of fields that inbound commands may overwrite
//!
//! Each external name maps to a typed field plus a handling tag. Only the
//! off duration is live-handled; every other change re-runs bootstrap.

use crate::error::CommandError;
use crate::event::Side;
use crate::spec::SourceKind;
use chrono::Weekday;
use serde_json::Value;

/// A programmable field of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time(Side),
    SunEvent(Side),
    Kind(Side),
    Topic(Side),
    Value(Side),
    Offset(Side),
    RandomOffset(Side),
    /// Duration of the off event after on
    Duration,
    Weekday(Weekday),
    Latitude,
    Longitude,
    Suspended,
}

/// How a change to a field is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Re-run bootstrap when the value changes
    Ordinary,
    /// Recompute the off time in place while the schedule is on
    LiveDuration,
}

#[derive(Debug, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field: Field,
    pub handling: Handling,
}

const fn ordinary(name: &'static str, field: Field) -> FieldDef {
    FieldDef {
        name,
        field,
        handling: Handling::Ordinary,
    }
}

pub static FIELDS: &[FieldDef] = &[
    ordinary("triggertime", Field::Time(Side::Trigger)),
    ordinary("ontime", Field::Time(Side::On)),
    ordinary("offtime", Field::Time(Side::Off)),
    ordinary("onsun", Field::SunEvent(Side::On)),
    ordinary("offsun", Field::SunEvent(Side::Off)),
    ordinary("ontype", Field::Kind(Side::On)),
    ordinary("offtype", Field::Kind(Side::Off)),
    ordinary("ontopic", Field::Topic(Side::On)),
    ordinary("offtopic", Field::Topic(Side::Off)),
    ordinary("onvalue", Field::Value(Side::On)),
    ordinary("onpayload", Field::Value(Side::On)),
    ordinary("offvalue", Field::Value(Side::Off)),
    ordinary("offpayload", Field::Value(Side::Off)),
    ordinary("onoffset", Field::Offset(Side::On)),
    ordinary("offoffset", Field::Offset(Side::Off)),
    ordinary("onrandomoffset", Field::RandomOffset(Side::On)),
    ordinary("offrandomoffset", Field::RandomOffset(Side::Off)),
    FieldDef {
        name: "duration",
        field: Field::Duration,
        handling: Handling::LiveDuration,
    },
    ordinary("mon", Field::Weekday(Weekday::Mon)),
    ordinary("tue", Field::Weekday(Weekday::Tue)),
    ordinary("wed", Field::Weekday(Weekday::Wed)),
    ordinary("thu", Field::Weekday(Weekday::Thu)),
    ordinary("fri", Field::Weekday(Weekday::Fri)),
    ordinary("sat", Field::Weekday(Weekday::Sat)),
    ordinary("sun", Field::Weekday(Weekday::Sun)),
    ordinary("lat", Field::Latitude),
    ordinary("lon", Field::Longitude),
    ordinary("suspended", Field::Suspended),
];

/// Find a field by external name, case-insensitively
pub fn lookup(name: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|def| def.name.eq_ignore_ascii_case(name))
}

/// A parsed field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Kind(SourceKind),
    Number(f64),
    Flag(bool),
}

impl FieldDef {
    /// Convert a raw inbound value into this field's type
    pub fn parse(&self, raw: &Value) -> Result<FieldValue, CommandError> {
        let invalid = || CommandError::InvalidValue {
            field: self.name.to_string(),
            value: text(raw),
        };

        match self.field {
            Field::Time(_)
            | Field::SunEvent(_)
            | Field::Topic(_)
            | Field::Value(_)
            | Field::Duration => Ok(FieldValue::Text(text(raw))),
            Field::Kind(_) => text(raw)
                .parse()
                .map(FieldValue::Kind)
                .map_err(|_| invalid()),
            Field::Offset(_) | Field::Latitude | Field::Longitude => {
                number(raw).map(FieldValue::Number).ok_or_else(invalid)
            }
            Field::RandomOffset(_) | Field::Weekday(_) | Field::Suspended => {
                Ok(FieldValue::Flag(to_boolean(raw)))
            }
        }
    }
}

/// `true` for a JSON true or the text "true" in any case
pub fn to_boolean(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;

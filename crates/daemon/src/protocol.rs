// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdin command framing.
//!
//! One command per line. A line that parses as JSON is taken as is;
//! anything else is passed on as a plain string command.

use serde_json::Value;
use std::io::BufRead;
use tokio::sync::mpsc;

/// Lines buffered between the reader thread and the event loop
const INPUT_BUFFER: usize = 64;

/// Decode one input line; blank lines carry no command
pub fn decode_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string())))
}

/// Read lines on a dedicated thread.
///
/// The channel closes at end of input or on a read error.
pub fn spawn_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Error reading input: {}", e);
                    break;
                }
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use ez_core::{EventInfo, Fill, LogicalState, NextFire, OutputSpec, Scope, Shape};
use serde_json::json;

/// A writer whose contents stay readable after being moved into the adapter
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn info() -> InfoSnapshot {
    InfoSnapshot {
        state: LogicalState::Off,
        events: vec![EventInfo {
            side: Side::On,
            topic: "porch".to_string(),
            property: "payload".to_string(),
            value: "on".to_string(),
            next: NextFire::At(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
        }],
    }
}

fn delivery(scope: Scope) -> Delivery {
    Delivery {
        side: Side::On,
        output: OutputSpec {
            topic: "porch".to_string(),
            value: "on".to_string(),
            scope,
            ..OutputSpec::default()
        },
        manual: true,
        at: Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap(),
        info: info(),
    }
}

#[tokio::test]
async fn writes_output_line_with_message_and_info() {
    let buffer = SharedBuffer::default();
    let adapter = StdoutAdapter::new(buffer.clone());

    adapter.deliver(&delivery(Scope::Msg)).await.unwrap();

    assert_eq!(
        buffer.lines(),
        vec![json!({
            "kind": "output",
            "side": "on",
            "manual": true,
            "message": {"topic": "porch", "payload": "on"},
            "info": {
                "state": "off",
                "events": [{
                    "side": "on",
                    "topic": "porch",
                    "property": "payload",
                    "value": "on",
                    "next": "2024-01-01T08:00:00+00:00"
                }]
            }
        })]
    );
}

#[tokio::test]
async fn writes_status_line() {
    let buffer = SharedBuffer::default();
    let adapter = StdoutAdapter::new(buffer.clone());

    adapter
        .status(&Status::new(Fill::Yellow, Shape::Dot, "ON @ 2024-01-01 08:00"))
        .await
        .unwrap();

    assert_eq!(
        buffer.lines(),
        vec![json!({
            "kind": "status",
            "fill": "yellow",
            "shape": "dot",
            "text": "ON @ 2024-01-01 08:00"
        })]
    );
}

#[tokio::test]
async fn writes_info_line() {
    let buffer = SharedBuffer::default();
    let adapter = StdoutAdapter::new(buffer.clone());

    adapter.info(&info()).await.unwrap();

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["kind"], "info");
    assert_eq!(lines[0]["state"], "off");
}

#[tokio::test]
async fn variable_scope_sets_variable_without_a_line() {
    let buffer = SharedBuffer::default();
    let adapter = StdoutAdapter::new(buffer.clone());

    adapter.deliver(&delivery(Scope::Global)).await.unwrap();

    assert!(buffer.lines().is_empty());
    assert_eq!(
        adapter.variables().get(Scope::Global, "payload"),
        Some(json!("on"))
    );
}

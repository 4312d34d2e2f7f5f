// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

use super::*;
use chrono::{Duration, TimeZone};
use ez_adapters::{FakeOutputAdapter, OutputCall};
use ez_core::{
    EventSpec, FakeClock, FakeSunTimes, Fill, FixedJitter, LogicalState, Shape, Side, Zone,
};
use serde_json::json;

type TestRuntime = Runtime<FakeOutputAdapter, FakeClock, FakeSunTimes, FixedJitter>;

// 2024-01-01 is a Monday
fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
}

fn lights() -> TimerConfig {
    TimerConfig::on_off(
        EventSpec::time_of_day("08:00").with_value("on"),
        EventSpec::time_of_day("22:00").with_value("off"),
    )
    .with_zone(Zone::utc())
}

fn lights_for(duration: &str) -> TimerConfig {
    TimerConfig::on_off(
        EventSpec::time_of_day("08:00").with_value("on"),
        EventSpec::duration(duration).with_value("off"),
    )
    .with_zone(Zone::utc())
}

async fn setup(config: TimerConfig, now: DateTime<Utc>) -> (TestRuntime, FakeClock) {
    let clock = FakeClock::at(now);
    let mut runtime = Runtime::new(
        RuntimeDeps {
            output: FakeOutputAdapter::new(),
            clock: clock.clone(),
            sun: FakeSunTimes::new(),
            jitter: FixedJitter(0.0),
        },
        config,
    );
    runtime.start().await.unwrap();
    (runtime, clock)
}

fn delivered(runtime: &TestRuntime) -> Vec<(Side, bool, String)> {
    runtime
        .output()
        .deliveries()
        .into_iter()
        .map(|d| (d.side, d.manual, d.output.value))
        .collect()
}

#[tokio::test]
async fn start_arms_both_events() {
    let (runtime, _clock) = setup(lights(), utc(1, 12, 0)).await;

    assert_eq!(runtime.next_deadline(), Some(utc(1, 22, 0)));
    assert!(delivered(&runtime).is_empty());

    let status = runtime.output().statuses().pop().unwrap();
    assert_eq!(status.fill, Fill::Yellow);
    assert_eq!(status.shape, Shape::Dot);
    assert!(status.text.contains("OFF @ 2024-01-01 22:00"));
}

#[tokio::test]
async fn poll_before_deadline_fires_nothing() {
    let (mut runtime, clock) = setup(lights(), utc(1, 12, 0)).await;
    runtime.output().clear();

    clock.set(utc(1, 21, 59));
    assert_eq!(runtime.poll().await.unwrap(), 0);
    assert!(runtime.output().calls().is_empty());
}

#[tokio::test]
async fn poll_fires_due_timers_and_rearms() {
    let (mut runtime, clock) = setup(lights(), utc(1, 12, 0)).await;

    clock.set(utc(1, 22, 0));
    assert_eq!(runtime.poll().await.unwrap(), 1);
    assert_eq!(delivered(&runtime), vec![(Side::Off, false, "off".into())]);
    assert_eq!(runtime.next_deadline(), Some(utc(2, 8, 0)));

    clock.set(utc(2, 8, 0));
    assert_eq!(runtime.poll().await.unwrap(), 1);
    assert_eq!(
        delivered(&runtime),
        vec![
            (Side::Off, false, "off".into()),
            (Side::On, false, "on".into()),
        ]
    );
    assert_eq!(runtime.next_deadline(), Some(utc(2, 22, 0)));
    assert_eq!(runtime.schedule().state(), Some(true));
}

#[tokio::test]
async fn duration_off_follows_on_through_timers() {
    let (mut runtime, clock) = setup(lights_for("02:00:00"), utc(1, 6, 0)).await;
    assert_eq!(runtime.next_deadline(), Some(utc(1, 8, 0)));

    clock.set(utc(1, 8, 0));
    runtime.poll().await.unwrap();
    assert_eq!(runtime.next_deadline(), Some(utc(1, 10, 0)));

    clock.set(utc(1, 10, 0));
    runtime.poll().await.unwrap();
    assert_eq!(
        delivered(&runtime),
        vec![
            (Side::On, false, "on".into()),
            (Side::Off, false, "off".into()),
        ]
    );
    assert_eq!(runtime.next_deadline(), Some(utc(2, 8, 0)));
}

#[tokio::test]
async fn manual_command_delivers_without_moving_timers() {
    let (mut runtime, clock) = setup(lights(), utc(1, 6, 0)).await;

    clock.set(utc(1, 13, 0));
    runtime.handle_input(&json!("on")).await.unwrap();

    assert_eq!(delivered(&runtime), vec![(Side::On, true, "on".into())]);
    assert_eq!(runtime.next_deadline(), Some(utc(1, 8, 0)));

    let status = runtime.output().statuses().pop().unwrap();
    assert_eq!(status.fill, Fill::Blue);
    assert_eq!(status.text, "ON manual until 2024-01-01 22:00");
}

#[tokio::test]
async fn info_command_reports_state() {
    let (mut runtime, _clock) = setup(lights(), utc(1, 12, 0)).await;
    runtime.output().clear();

    runtime.handle_input(&json!("info")).await.unwrap();

    let calls = runtime.output().calls();
    assert_eq!(calls.len(), 1);
    let OutputCall::Info(info) = &calls[0] else {
        panic!("expected info, got {:?}", calls[0]);
    };
    assert_eq!(info.state, LogicalState::On);
}

#[tokio::test]
async fn rejected_input_reports_status() {
    let (mut runtime, _clock) = setup(lights(), utc(1, 12, 0)).await;

    runtime.handle_input(&json!("bogus")).await.unwrap();

    let status = runtime.output().statuses().pop().unwrap();
    assert_eq!(status.fill, Fill::Red);
    assert_eq!(status.shape, Shape::Ring);
    assert_eq!(runtime.next_deadline(), Some(utc(1, 22, 0)));
}

#[tokio::test]
async fn startup_catch_up_fires_after_delay() {
    let (mut runtime, clock) = setup(lights().with_startup_message(), utc(1, 12, 0)).await;
    assert_eq!(
        runtime.next_deadline(),
        Some(utc(1, 12, 0) + Duration::milliseconds(2500))
    );

    clock.advance(Duration::milliseconds(2500));
    assert_eq!(runtime.poll().await.unwrap(), 1);

    assert_eq!(delivered(&runtime), vec![(Side::On, false, "on".into())]);
    assert_eq!(runtime.next_deadline(), Some(utc(1, 22, 0)));
}

#[tokio::test]
async fn suspended_schedule_arms_nothing() {
    let (runtime, _clock) = setup(lights().suspended(), utc(1, 12, 0)).await;

    assert_eq!(runtime.next_deadline(), None);
    let status = runtime.output().statuses().pop().unwrap();
    assert_eq!(status.fill, Fill::Grey);
    assert_eq!(status.text, "Scheduling suspended");
}

#[tokio::test]
async fn suspend_command_releases_timers_and_resume_restores() {
    let (mut runtime, _clock) = setup(lights(), utc(1, 12, 0)).await;

    runtime
        .handle_input(&json!({"suspended": true}))
        .await
        .unwrap();
    assert_eq!(runtime.next_deadline(), None);

    runtime
        .handle_input(&json!({"suspended": false}))
        .await
        .unwrap();
    assert_eq!(runtime.next_deadline(), Some(utc(1, 22, 0)));
}

#[tokio::test]
async fn shutdown_releases_timers_silently() {
    let (mut runtime, _clock) = setup(lights().with_startup_message(), utc(1, 12, 0)).await;
    runtime.output().clear();

    runtime.shutdown().await.unwrap();

    assert_eq!(runtime.next_deadline(), None);
    assert!(runtime.output().calls().is_empty());
}

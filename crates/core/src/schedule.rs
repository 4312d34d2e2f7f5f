// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule state machine
//!
//! A [`Schedule`] owns the events of one timer instance and the settings
//! they resolve against. Every operation is pure: it takes the current
//! instant through [`ResolveEnv`] and returns the effects the runtime must
//! carry out (arm or cancel timers, deliver payloads, publish status).
//!
//! Suspension is derived: an explicit flag or an empty weekday mask. While
//! suspended no timers are armed, but manual fires still deliver.

use crate::command::{self, Command, FieldUpdate};
use crate::config::{TimerConfig, TimerType};
use crate::effect::{Delivery, Effect, LogLevel, TimerKey, TimerToken};
use crate::error::{CommandError, ResolveError};
use crate::event::{Event, Side};
use crate::expr::parse_duration;
use crate::field::{Field, FieldValue, Handling};
use crate::info::{logical_state, EventInfo, InfoSnapshot, LogicalState, NextFire};
use crate::jitter::Jitter;
use crate::resolve::{apply_offset, resolve, Resolution, ResolveContext};
use crate::spec::SourceKind;
use crate::status::{project, Status, StatusContext};
use crate::sun::SunTimes;
use crate::weekday::WeekdayMask;
use crate::zone::Zone;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Delay before the startup catch-up payload is emitted
pub const STARTUP_DELAY_MS: i64 = 2500;

/// Process-wide settings of one schedule instance
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    pub timer_type: TimerType,
    pub zone: Zone,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub suspended: bool,
    pub startup_message: bool,
    pub send_events_on_suspend: bool,
    pub weekdays: WeekdayMask,
}

impl ScheduleConfig {
    fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Collaborators consulted while resolving
#[derive(Clone, Copy)]
pub struct ResolveEnv<'a> {
    pub now: DateTime<Utc>,
    pub sun: &'a dyn SunTimes,
    pub jitter: &'a dyn Jitter,
}

/// Result of scheduling one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Armed(DateTime<Utc>),
    /// Manual events have no automatic time
    Unscheduled,
    Failed(ResolveError),
}

impl Outcome {
    fn is_loud_failure(&self) -> bool {
        matches!(self, Outcome::Failed(e) if !e.is_silent())
    }
}

#[derive(Debug, Clone)]
pub struct Schedule {
    config: ScheduleConfig,
    /// The on event, or the trigger
    primary: Event,
    off: Option<Event>,
    /// On/off state established by the last fire
    state: Option<bool>,
    last_token: u64,
    startup: Option<TimerToken>,
}

impl Schedule {
    pub fn new(config: TimerConfig) -> Self {
        let TimerConfig {
            timer_type,
            timezone,
            latitude,
            longitude,
            suspended,
            startup_message,
            send_events_on_suspend,
            weekdays,
            on,
            off,
            trigger,
        } = config;

        let (primary, off) = match timer_type {
            TimerType::OnOff => (
                Event::new(Side::On, on.unwrap_or_default()),
                Some(Event::new(Side::Off, off.unwrap_or_default())),
            ),
            TimerType::Trigger => (Event::new(Side::Trigger, trigger.unwrap_or_default()), None),
        };

        Self {
            config: ScheduleConfig {
                timer_type,
                zone: timezone,
                latitude,
                longitude,
                suspended,
                startup_message,
                send_events_on_suspend,
                weekdays,
            },
            primary,
            off,
            state: None,
            last_token: 0,
            startup: None,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn event(&self, side: Side) -> Option<&Event> {
        match side {
            Side::Off => self.off.as_ref(),
            _ if self.primary.side == side => Some(&self.primary),
            _ => None,
        }
    }

    fn event_mut(&mut self, side: Side) -> Option<&mut Event> {
        match side {
            Side::Off => self.off.as_mut(),
            _ if self.primary.side == side => Some(&mut self.primary),
            _ => None,
        }
    }

    fn sides(&self) -> Vec<Side> {
        let mut sides = vec![self.primary.side];
        if self.off.is_some() {
            sides.push(Side::Off);
        }
        sides
    }

    pub fn is_paired(&self) -> bool {
        self.off.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.config.suspended || self.config.weekdays.is_empty()
    }

    pub fn state(&self) -> Option<bool> {
        self.state
    }

    /// Number of event timers currently armed
    pub fn armed_timers(&self) -> usize {
        self.sides()
            .into_iter()
            .filter_map(|side| self.event(side))
            .filter(|event| event.is_armed())
            .count()
    }

    fn next_token(&mut self) -> TimerToken {
        self.last_token += 1;
        TimerToken(self.last_token)
    }

    fn status(&self, ctx: StatusContext) -> Effect {
        Effect::Status(project(&ctx, self.config.zone))
    }

    pub fn status_for(&self, ctx: &StatusContext) -> Status {
        project(ctx, self.config.zone)
    }

    /// Entry point at construction and after any reconfiguration
    pub fn bootstrap(&mut self, env: ResolveEnv<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.startup.take().is_some() {
            effects.push(Effect::CancelTimer {
                key: TimerKey::Startup,
            });
        }

        if self.is_suspended() {
            self.suspend(env.now, &mut effects);
            return effects;
        }

        self.resume(env, &mut effects);
        if self.config.startup_message && self.is_paired() {
            let token = self.next_token();
            self.startup = Some(token);
            effects.push(Effect::SetTimer {
                key: TimerKey::Startup,
                token,
                at: env.now + Duration::milliseconds(STARTUP_DELAY_MS),
            });
        }
        effects
    }

    fn suspend(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        for side in self.sides() {
            if let Some(effect) = self.event_mut(side).and_then(Event::disarm) {
                effects.push(effect);
            }
        }
        if self.config.send_events_on_suspend && self.is_paired() {
            self.emit(Side::Off, false, now, effects);
        }
        effects.push(self.status(StatusContext::Suspended {
            no_weekdays: self.config.weekdays.is_empty(),
        }));
    }

    fn resume(&mut self, env: ResolveEnv<'_>, effects: &mut Vec<Effect>) {
        // Duration events chain off their pair, so they resolve last
        let mut sides = self.sides();
        sides.sort_by_key(|side| {
            self.event(*side)
                .is_some_and(|event| event.spec.kind == SourceKind::Duration)
        });

        let mut loud_failure = false;
        for side in sides {
            let outcome = self.schedule_event(side, true, false, env, effects);
            loud_failure |= outcome.is_loud_failure();
        }

        if !loud_failure {
            let upcoming = self
                .sides()
                .into_iter()
                .filter_map(|side| Some((side, self.event(side)?.next_fire?)))
                .collect();
            effects.push(self.status(StatusContext::Scheduled { upcoming }));
        }
    }

    /// Resolve `side` and arm its timer, releasing any previous one.
    ///
    /// Failure leaves the event unscheduled and reports the reason unless it
    /// is the silent wait on the paired event.
    pub fn schedule_event(
        &mut self,
        side: Side,
        initial: bool,
        manual_basis: bool,
        env: ResolveEnv<'_>,
        effects: &mut Vec<Effect>,
    ) -> Outcome {
        let Some(event) = self.event(side) else {
            return Outcome::Unscheduled;
        };
        let inverse = side.inverse().and_then(|inv| self.event(inv));
        let ctx = ResolveContext {
            now: env.now,
            zone: self.config.zone,
            initial,
            manual_basis,
            weekdays: self.config.weekdays,
            coordinates: self.config.coordinates(),
            inverse_last_fire: inverse.and_then(|e| e.last_fire),
            inverse_next_fire: inverse.and_then(|e| e.next_fire),
            jitter: env.jitter.sample(),
        };
        let resolution = resolve(&event.spec, &ctx, env.sun);

        match resolution {
            Ok(Resolution {
                at: Some(at),
                substituted,
            }) => {
                if let Some((requested, used)) = substituted {
                    effects.push(Effect::log(
                        LogLevel::Warn,
                        format!(
                            "{} sun event {} unavailable, using {}",
                            side, requested, used
                        ),
                    ));
                }
                let token = self.next_token();
                if let Some(event) = self.event_mut(side) {
                    effects.extend(event.arm(token, at));
                }
                Outcome::Armed(at)
            }
            Ok(Resolution { at: None, .. }) => {
                self.disarm(side, effects);
                Outcome::Unscheduled
            }
            Err(e) => {
                self.disarm(side, effects);
                if e.is_silent() {
                    effects.push(Effect::log(
                        LogLevel::Debug,
                        format!("{} deferred: {}", side, e),
                    ));
                } else {
                    effects.push(Effect::log(
                        LogLevel::Warn,
                        format!("{} unscheduled: {}", side, e),
                    ));
                    effects.push(self.status(StatusContext::Error {
                        side,
                        reason: e.to_string(),
                    }));
                }
                Outcome::Failed(e)
            }
        }
    }

    fn disarm(&mut self, side: Side, effects: &mut Vec<Effect>) {
        if let Some(effect) = self.event_mut(side).and_then(Event::disarm) {
            effects.push(effect);
        }
    }

    fn disarm_all(&mut self, effects: &mut Vec<Effect>) {
        for side in self.sides() {
            self.disarm(side, effects);
        }
        if self.startup.take().is_some() {
            effects.push(Effect::CancelTimer {
                key: TimerKey::Startup,
            });
        }
    }

    /// Deliver `side`'s payload, record the fire and flip the state.
    ///
    /// Automatic fires honour `suppress_repeated`; manual fires always
    /// deliver.
    fn emit(&mut self, side: Side, manual: bool, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        let previous = self.state;
        let Some(event) = self.event_mut(side) else {
            return;
        };
        event.last_fire = Some(now);
        let output = event.spec.output.clone();
        let suppress = !manual
            && event.spec.suppress_repeated
            && side.boolean_state().is_some()
            && previous == side.boolean_state();

        if let Some(state) = side.boolean_state() {
            self.state = Some(state);
        }
        if suppress {
            effects.push(Effect::log(
                LogLevel::Debug,
                format!("{} suppressed: state unchanged", side),
            ));
            return;
        }
        effects.push(Effect::Deliver(Delivery {
            side,
            output,
            manual,
            at: now,
            info: self.info(),
        }));
    }

    fn fired_status(&self, side: Side, manual: bool) -> Effect {
        let upcoming = match side.inverse() {
            Some(inverse) => self.event(inverse).and_then(|e| e.next_fire),
            None => self.event(side).and_then(|e| e.next_fire),
        };
        self.status(StatusContext::Fired {
            side,
            manual,
            suspended: self.is_suspended(),
            upcoming,
        })
    }

    /// Handle a timer expiry; stale tokens are ignored
    pub fn timer_fired(
        &mut self,
        key: TimerKey,
        token: TimerToken,
        env: ResolveEnv<'_>,
    ) -> Vec<Effect> {
        let live = match key {
            TimerKey::Startup => {
                let live = self.startup == Some(token);
                if live {
                    self.startup = None;
                }
                live
            }
            TimerKey::Event(side) => self
                .event_mut(side)
                .is_some_and(|event| event.take_expired(token)),
        };

        if !live {
            return vec![Effect::log(
                LogLevel::Debug,
                format!("ignoring stale timer {} {}", key, token),
            )];
        }

        match key {
            TimerKey::Startup => self.catch_up(env.now),
            TimerKey::Event(side) => self.fire(side, env),
        }
    }

    fn fire(&mut self, side: Side, env: ResolveEnv<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.emit(side, false, env.now, &mut effects);

        let mut outcome = Outcome::Unscheduled;
        if self.is_suspended() {
            self.disarm(side, &mut effects);
        } else {
            outcome = self.schedule_event(side, false, false, env, &mut effects);
        }

        if !outcome.is_loud_failure() {
            effects.push(self.fired_status(side, false));
        }
        effects
    }

    // The side that fires next is the opposite of what should hold now.
    fn catch_up(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let on = self.event(Side::On).and_then(|e| e.next_fire);
        let off = self.event(Side::Off).and_then(|e| e.next_fire);
        let current = match (on, off) {
            (Some(on), Some(off)) if off > on => Side::Off,
            (Some(_), Some(_)) => Side::On,
            _ => return Vec::new(),
        };

        let mut effects = Vec::new();
        self.emit(current, false, now, &mut effects);
        effects.push(self.fired_status(current, false));
        effects
    }

    /// Fire `side` by command, leaving the other event's timer alone
    pub fn manual_fire(
        &mut self,
        side: Side,
        env: ResolveEnv<'_>,
    ) -> Result<Vec<Effect>, CommandError> {
        let side = match (side, self.primary.side) {
            (Side::On | Side::Trigger, Side::Trigger) => Side::Trigger,
            (Side::On | Side::Off, Side::On) => side,
            (requested, _) => return Err(CommandError::NotApplicable(requested.to_string())),
        };

        let mut effects = Vec::new();
        self.emit(side, true, env.now, &mut effects);

        if !self.is_suspended() {
            match side {
                Side::Off => {
                    self.schedule_event(Side::Off, false, false, env, &mut effects);
                }
                Side::On => {
                    let duration_off = self
                        .off
                        .as_ref()
                        .is_some_and(|off| off.spec.kind == SourceKind::Duration);
                    if duration_off {
                        self.schedule_event(Side::Off, false, true, env, &mut effects);
                    }
                }
                Side::Trigger => {}
            }
        }

        effects.push(self.fired_status(side, true));
        Ok(effects)
    }

    /// Drop the current cycle without output and re-derive from now
    pub fn cancel(&mut self, env: ResolveEnv<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.disarm_all(&mut effects);
        if self.is_suspended() {
            effects.push(self.status(StatusContext::Suspended {
                no_weekdays: self.config.weekdays.is_empty(),
            }));
        } else {
            self.resume(env, &mut effects);
        }
        effects
    }

    /// Re-emit the payload of the current logical state
    pub fn sync(&self, now: DateTime<Utc>) -> Vec<Effect> {
        let info = self.info();
        let side = match info.state {
            LogicalState::On => Side::On,
            LogicalState::Off => Side::Off,
            LogicalState::Suspended | LogicalState::Undefined => match self.state {
                Some(true) => Side::On,
                Some(false) => Side::Off,
                None => {
                    return vec![Effect::log(LogLevel::Info, "sync: no state to re-emit")];
                }
            },
        };
        let Some(event) = self.event(side) else {
            return Vec::new();
        };
        vec![Effect::Deliver(Delivery {
            side,
            output: event.spec.output.clone(),
            manual: false,
            at: now,
            info,
        })]
    }

    /// Disarm everything; no output
    pub fn shutdown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.disarm_all(&mut effects);
        effects
    }

    pub fn info(&self) -> InfoSnapshot {
        let suspended = self.is_suspended();
        let state = logical_state(
            suspended,
            self.is_paired(),
            self.state,
            self.event(Side::On).and_then(|e| e.next_fire),
            self.event(Side::Off).and_then(|e| e.next_fire),
        );

        let events = self
            .sides()
            .into_iter()
            .filter_map(|side| self.event(side))
            .map(|event| EventInfo {
                side: event.side,
                topic: event.spec.output.topic.clone(),
                property: event.spec.output.property.clone(),
                value: event.spec.output.value.clone(),
                next: match event.next_fire {
                    _ if suspended => NextFire::Suspended,
                    _ if event.is_manual() => NextFire::Manual,
                    Some(at) => NextFire::At(at),
                    None if self.awaits_pair(event) => NextFire::Pending,
                    None => NextFire::Unscheduled,
                },
            })
            .collect();

        InfoSnapshot { state, events }
    }

    // Mirrors the resolver: a duration event with no paired time to chain
    // from is deferred, not failed.
    fn awaits_pair(&self, event: &Event) -> bool {
        event.spec.kind == SourceKind::Duration
            && event
                .side
                .inverse()
                .and_then(|inverse| self.event(inverse))
                .map_or(true, |inverse| inverse.next_fire.is_none())
    }

    /// Interpret an inbound message; rejected input yields a status
    pub fn dispatch(&mut self, input: &Value, env: ResolveEnv<'_>) -> Vec<Effect> {
        let result = command::parse(input).and_then(|command| match command {
            Command::Fire(side) => self.manual_fire(side, env),
            Command::Cancel => Ok(self.cancel(env)),
            Command::Info => Ok(vec![Effect::Info(self.info())]),
            Command::Sync => Ok(self.sync(env.now)),
            Command::Update(updates) => self.apply_updates(&updates, env),
        });

        result.unwrap_or_else(|e| {
            vec![
                Effect::log(LogLevel::Warn, format!("rejected input {}: {:?}", input, e)),
                self.status(StatusContext::Rejected {
                    reason: e.to_string(),
                }),
            ]
        })
    }

    // Fields addressing the on side reach the trigger of a trigger schedule.
    fn target(&self, side: Side) -> Result<Side, CommandError> {
        match side {
            Side::Off if self.off.is_none() => Err(CommandError::NotApplicable(side.to_string())),
            Side::Off => Ok(Side::Off),
            Side::On | Side::Trigger => Ok(self.primary.side),
        }
    }

    /// Apply field updates and reschedule as needed.
    ///
    /// Values equal to the current ones change nothing. A changed off
    /// duration while the schedule is on is applied live; any other change
    /// re-runs bootstrap.
    pub fn apply_updates(
        &mut self,
        updates: &[FieldUpdate],
        env: ResolveEnv<'_>,
    ) -> Result<Vec<Effect>, CommandError> {
        for update in updates {
            self.check(update)?;
        }

        let mut changed = false;
        let mut duration_changed = false;
        for update in updates {
            if self.apply(update)? {
                match update.def.handling {
                    Handling::Ordinary => changed = true,
                    Handling::LiveDuration => duration_changed = true,
                }
            }
        }

        let live = duration_changed
            && !changed
            && !self.is_suspended()
            && self.state == Some(true)
            && self
                .off
                .as_ref()
                .is_some_and(|off| off.spec.kind == SourceKind::Duration);

        if live {
            Ok(self.reschedule_off_live(env))
        } else if changed || duration_changed {
            Ok(self.bootstrap(env))
        } else {
            Ok(Vec::new())
        }
    }

    // Runs for every update before any is applied, so a rejected command
    // leaves the schedule untouched.
    fn check(&self, update: &FieldUpdate) -> Result<(), CommandError> {
        let range = match update.def.field {
            Field::Latitude => Some(-90.0..=90.0),
            Field::Longitude => Some(-180.0..=180.0),
            _ => None,
        };
        if let (Some(range), FieldValue::Number(value)) = (range, &update.value) {
            if !range.contains(value) {
                return Err(CommandError::InvalidValue {
                    field: update.def.name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        let side = match update.def.field {
            Field::Time(side)
            | Field::SunEvent(side)
            | Field::Kind(side)
            | Field::Topic(side)
            | Field::Value(side)
            | Field::Offset(side)
            | Field::RandomOffset(side) => side,
            Field::Duration => Side::Off,
            Field::Weekday(_) | Field::Latitude | Field::Longitude | Field::Suspended => {
                return Ok(())
            }
        };
        self.target(side).map(|_| ())
    }

    /// Write one field; returns whether the value changed
    fn apply(&mut self, update: &FieldUpdate) -> Result<bool, CommandError> {
        let invalid = || CommandError::InvalidValue {
            field: update.def.name.to_string(),
            value: format!("{:?}", update.value),
        };

        match (update.def.field, &update.value) {
            (Field::Weekday(day), FieldValue::Flag(allowed)) => {
                Ok(self.config.weekdays.set(day, *allowed))
            }
            (Field::Latitude, FieldValue::Number(value)) => {
                Ok(replace(&mut self.config.latitude, Some(*value)))
            }
            (Field::Longitude, FieldValue::Number(value)) => {
                Ok(replace(&mut self.config.longitude, Some(*value)))
            }
            (Field::Suspended, FieldValue::Flag(value)) => {
                Ok(replace(&mut self.config.suspended, *value))
            }
            (Field::Duration, FieldValue::Text(value)) => {
                let event = self.event_for(Side::Off)?;
                Ok(replace(&mut event.spec.duration, value.clone()))
            }
            (Field::Time(side), FieldValue::Text(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.time, value.clone()))
            }
            (Field::SunEvent(side), FieldValue::Text(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.sun_event, value.clone()))
            }
            (Field::Kind(side), FieldValue::Kind(kind)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.kind, *kind))
            }
            (Field::Topic(side), FieldValue::Text(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.output.topic, value.clone()))
            }
            (Field::Value(side), FieldValue::Text(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.output.value, value.clone()))
            }
            (Field::Offset(side), FieldValue::Number(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.offset, *value))
            }
            (Field::RandomOffset(side), FieldValue::Flag(value)) => {
                let event = self.event_for(side)?;
                Ok(replace(&mut event.spec.random_offset, *value))
            }
            _ => Err(invalid()),
        }
    }

    fn event_for(&mut self, side: Side) -> Result<&mut Event, CommandError> {
        let side = self.target(side)?;
        self.event_mut(side)
            .ok_or_else(|| CommandError::NotApplicable(side.to_string()))
    }

    /// Recompute the off time against the last on fire.
    ///
    /// Already past: fire off now. Otherwise re-arm silently.
    fn reschedule_off_live(&mut self, env: ResolveEnv<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(basis) = self.primary.last_fire else {
            return self.bootstrap(env);
        };
        let Some(off) = self.off.as_ref() else {
            return effects;
        };

        let resolved = parse_duration(&off.spec.duration).and_then(|duration| {
            let at = basis
                .checked_add_signed(duration)
                .ok_or_else(|| ResolveError::InvalidTimeFormat(off.spec.duration.clone()))?;
            apply_offset(at, &off.spec, env.jitter.sample())
        });
        let at = match resolved {
            Ok(at) => at,
            Err(e) => {
                self.disarm(Side::Off, &mut effects);
                effects.push(self.status(StatusContext::Error {
                    side: Side::Off,
                    reason: e.to_string(),
                }));
                return effects;
            }
        };

        if at <= env.now {
            self.disarm(Side::Off, &mut effects);
            effects.extend(self.fire(Side::Off, env));
        } else {
            let token = self.next_token();
            if let Some(off) = self.off.as_mut() {
                effects.extend(off.arm(token, at));
            }
        }
        effects
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;

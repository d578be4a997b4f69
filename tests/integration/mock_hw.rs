//! Mock hardware adapters for integration tests.
//!
//! Every mock records its calls behind an `Arc<Mutex<..>>`, so a test can
//! hand one clone to the core (possibly on another thread) and assert on
//! the full history through the other.

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thermostat::app::events::AppEvent;
use thermostat::app::ports::{
    Clock, DisplayPort, EventSink, LampPort, StatusTransport, TemperatureSensor,
};
use thermostat::error::{ActuatorError, DisplayError, SensorError, TransportError};

// ── Lamp call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampCall {
    Off,
    Solid,
    Pulse,
}

// ── MockLamp ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLamp {
    pub calls: Arc<Mutex<Vec<LampCall>>>,
}

#[allow(dead_code)]
impl MockLamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LampCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Output the lamp is currently driven to (off if never touched).
    pub fn state(&self) -> LampCall {
        self.calls.lock().unwrap().last().copied().unwrap_or(LampCall::Off)
    }

    pub fn count(&self, call: LampCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl LampPort for MockLamp {
    fn off(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(LampCall::Off);
        Ok(())
    }

    fn solid(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(LampCall::Solid);
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(LampCall::Pulse);
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Settable wall clock.
#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(hour: u32, minute: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, hour: u32, minute: u32) {
        *self.now.lock().unwrap() = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

// ── MockSensor ────────────────────────────────────────────────

/// Sensor that reports a settable °F value, or fails.
#[derive(Clone)]
pub struct MockSensor {
    reading: Arc<Mutex<Result<f32, SensorError>>>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn reading(fahrenheit: f32) -> Self {
        Self {
            reading: Arc::new(Mutex::new(Ok(fahrenheit))),
        }
    }

    pub fn set(&self, fahrenheit: f32) {
        *self.reading.lock().unwrap() = Ok(fahrenheit);
    }

    pub fn fail(&self) {
        *self.reading.lock().unwrap() = Err(SensorError::Bus);
    }
}

impl TemperatureSensor for MockSensor {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.read_fahrenheit().map(|f| (f - 32.0) * 5.0 / 9.0)
    }

    // Exact °F so tests can assert on floors without conversion noise.
    fn read_fahrenheit(&mut self) -> Result<f32, SensorError> {
        *self.reading.lock().unwrap()
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDisplay {
    pub frames: Arc<Mutex<Vec<(String, String)>>>,
    pub releases: Arc<Mutex<u32>>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<(String, String)> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last_frame(&self) -> Option<(String, String)> {
        self.frames.lock().unwrap().last().cloned()
    }

    pub fn release_count(&self) -> u32 {
        *self.releases.lock().unwrap()
    }
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        self.frames
            .lock()
            .unwrap()
            .push((line1.to_owned(), line2.to_owned()));
        Ok(())
    }

    fn release(&mut self) {
        *self.releases.lock().unwrap() += 1;
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockTransport {
    pub lines: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl StatusTransport for MockTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        self.lines.lock().unwrap().push(line.to_owned());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event-log type strings, in emission order.
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.to_event_record())
            .map(|r| r.event_type)
            .collect()
    }

    pub fn readings(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, AppEvent::Reading(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

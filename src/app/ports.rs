//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermostatCore / ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensor, lamps, display, status transport, storage,
//! clock, event sinks) implement these traits.  The core consumes them via
//! generics, so the domain never touches hardware directly.
//!
//! Every fallible port returns a typed error.  The core logs and absorbs
//! them; none of them can stop the control loop.

use chrono::{NaiveDateTime, Timelike};

use super::events::{AppEvent, EventRecord, ReadingRecord};
use crate::config::ThermostatConfig;
use crate::error::{
    ActuatorError, ConfigError, DisplayError, PersistenceError, SensorError, TransportError,
};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One temperature acquisition.  Implementations must keep the bus
/// transaction short and bounded.
pub trait TemperatureSensor {
    fn read_celsius(&mut self) -> Result<f32, SensorError>;

    /// Read and convert: `F = C × 9/5 + 32`.
    fn read_fahrenheit(&mut self) -> Result<f32, SensorError> {
        self.read_celsius().map(celsius_to_fahrenheit)
    }
}

pub fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

// ───────────────────────────────────────────────────────────────
// Lamp port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A single lamp/actuator output.
pub trait LampPort {
    /// Fully off; stops any running pulse.
    fn off(&mut self) -> Result<(), ActuatorError>;

    /// Constant full brightness.
    fn solid(&mut self) -> Result<(), ActuatorError>;

    /// Start an open-ended fade in/out cycle that keeps running until the
    /// next call on this lamp.
    fn pulse(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Two-line character display.  Callers always pass both lines already
/// fitted to the panel width.
pub trait DisplayPort {
    fn render(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError>;

    /// Blank and hand back the panel.  Called once at shutdown.
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status transport port
// ───────────────────────────────────────────────────────────────

/// Byte-stream sink for the machine-readable status line.
pub trait StatusTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Reading store port (append-only persistence)
// ───────────────────────────────────────────────────────────────

/// Two append-only tables: readings and events.  Best-effort; callers
/// never block on or retry a failed write.
pub trait ReadingStore {
    fn log_reading(&mut self, record: &ReadingRecord) -> Result<(), PersistenceError>;

    fn log_event(&mut self, record: &EventRecord) -> Result<(), PersistenceError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// Minutes since local midnight (0–1439).
    fn minute_of_day(&self) -> u16 {
        minute_of_day(&self.now())
    }
}

pub fn minute_of_day(t: &NaiveDateTime) -> u16 {
    (t.hour() * 60 + t.minute()) as u16
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / persistence)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (log, reading store, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the startup configuration.
///
/// Implementations must run [`ThermostatConfig::validate`] and report
/// failures as [`ConfigError::ValidationFailed`], not clamp silently.
pub trait ConfigPort {
    fn load(&self) -> Result<ThermostatConfig, ConfigError>;
}

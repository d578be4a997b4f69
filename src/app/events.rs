//! Outbound application events and the persistence records derived from them.
//!
//! The [`ThermostatCore`](super::service::ThermostatCore) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log them, append them to
//! the reading store, or record them in a test.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::input::InputEvent;
use crate::fsm::Mode;

/// Timestamp format of persisted records (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The core has started (carries the initial mode).
    Started(Mode),

    /// A manual input was accepted.  Emitted before its effect is applied.
    Input { event: InputEvent, at: NaiveDateTime },

    /// The mode machine moved to the next mode.
    ModeChanged {
        from: Mode,
        to: Mode,
        at: NaiveDateTime,
    },

    /// Periodic reading, emitted with every status line.
    Reading(ReadingRecord),

    /// The control loop has stopped and released its outputs.
    Stopped,
}

impl AppEvent {
    /// Event-table record for events that belong in the event log.
    pub fn to_event_record(&self) -> Option<EventRecord> {
        match self {
            Self::Input { event, at } => Some(EventRecord::new(at, event.event_type())),
            Self::ModeChanged { to, at, .. } => {
                Some(EventRecord::new(at, &format!("state_change:{}", to.label())))
            }
            Self::Started(_) | Self::Reading(_) | Self::Stopped => None,
        }
    }
}

/// One row of the readings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub timestamp: String,
    /// Smoothed °F, `None` when the sensor gave no reading.
    pub temperature: Option<f32>,
    pub setpoint: i32,
    pub state: String,
}

impl ReadingRecord {
    pub fn new(at: &NaiveDateTime, temperature: Option<f32>, setpoint: i32, mode: Mode) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            temperature,
            setpoint,
            state: mode.label().to_owned(),
        }
    }
}

/// One row of the events table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: String,
    pub event_type: String,
}

impl EventRecord {
    pub fn new(at: &NaiveDateTime, event_type: &str) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            event_type: event_type.to_owned(),
        }
    }
}

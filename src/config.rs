//! Thermostat configuration parameters
//!
//! All tunable parameters for the controller.  Loaded once at startup from a
//! JSON file through [`ConfigPort`](crate::app::ports::ConfigPort); any field
//! missing from the file takes its default.

use serde::{Deserialize, Serialize};

use crate::control::schedule::{MAX_SCHEDULE_ENTRIES, parse_hhmm};
use crate::error::ConfigError;

/// Largest supported moving-average window.
pub const MAX_MA_WINDOW: usize = 64;

/// One row of the time-of-day schedule as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntryConfig {
    /// Start time, "HH:MM" (24 h, local time).
    pub start: String,
    /// Base setpoint in °F from `start` until the next entry.
    pub setpoint: i32,
}

impl ScheduleEntryConfig {
    pub fn new(start: &str, setpoint: i32) -> Self {
        Self {
            start: start.to_owned(),
            setpoint,
        }
    }
}

/// Core thermostat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    // --- Control ---
    /// Moving-average window (1 = pass-through)
    pub ma_window: usize,
    /// Hysteresis band in °F around the setpoint
    pub hysteresis_f: f32,
    /// Base setpoint (°F) before the first schedule refresh
    pub initial_setpoint: i32,

    // --- Schedule ---
    /// Whether the schedule drives the base setpoint
    pub schedule_enabled: bool,
    /// Time-of-day → base setpoint entries, any order
    pub schedule: Vec<ScheduleEntryConfig>,

    // --- Timing ---
    /// Control loop period (milliseconds)
    pub tick_period_ms: u64,
    /// Status line + reading log cadence (ticks)
    pub status_period_ticks: u32,
    /// Ticks each display page stays up before alternating
    pub display_alternate_ticks: u32,
    /// Wait for the loop to stop before forcing the display release (milliseconds)
    pub shutdown_grace_ms: u64,
    /// Lamp pulse fade-in / fade-out duration (milliseconds)
    pub pulse_fade_ms: u32,

    // --- Outputs ---
    /// Append readings and events to the JSON-lines store
    pub persistence_enabled: bool,
    /// Directory holding the JSON-lines store
    pub data_dir: String,
    /// Byte-stream device for the status line; `None` writes to stdout
    pub status_output: Option<String>,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            // Control
            ma_window: 10,
            hysteresis_f: 1.0,
            initial_setpoint: 72,

            // Schedule
            schedule_enabled: true,
            schedule: vec![
                ScheduleEntryConfig::new("06:00", 70), // day
                ScheduleEntryConfig::new("22:00", 65), // night
            ],

            // Timing
            tick_period_ms: 1000,       // 1 Hz
            status_period_ticks: 30,    // every 30 s
            display_alternate_ticks: 5, // 5 s per page
            shutdown_grace_ms: 1000,
            pulse_fade_ms: 500,

            // Outputs
            persistence_enabled: true,
            data_dir: "thermostat_data".to_owned(),
            status_output: None,
        }
    }
}

impl ThermostatConfig {
    /// Reject values the controller cannot run with.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_window == 0 || self.ma_window > MAX_MA_WINDOW {
            return Err(ConfigError::ValidationFailed("ma_window must be 1..=64"));
        }
        if !self.hysteresis_f.is_finite() || self.hysteresis_f < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "hysteresis_f must be finite and >= 0",
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_period_ms must be > 0"));
        }
        if self.status_period_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "status_period_ticks must be > 0",
            ));
        }
        if self.display_alternate_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "display_alternate_ticks must be > 0",
            ));
        }
        if self.schedule.len() > MAX_SCHEDULE_ENTRIES {
            return Err(ConfigError::ValidationFailed(
                "schedule holds at most 24 entries",
            ));
        }
        if self.schedule_enabled && self.schedule.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "schedule must not be empty while enabled",
            ));
        }

        let mut seen: heapless::Vec<u16, MAX_SCHEDULE_ENTRIES> = heapless::Vec::new();
        for entry in &self.schedule {
            let minute = parse_hhmm(&entry.start)
                .ok_or(ConfigError::ValidationFailed("schedule start must be HH:MM"))?;
            if seen.contains(&minute) {
                return Err(ConfigError::ValidationFailed(
                    "duplicate schedule start time",
                ));
            }
            // Capacity already checked above.
            let _ = seen.push(minute);
        }

        Ok(())
    }
}

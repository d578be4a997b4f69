//! Periodic control / render / telemetry loop.
//!
//! One tick every `tick_period_ms`:
//!
//! ```text
//!   read sensor (own bus lock, outside the core lock)
//!        │
//!   ┌────▼──────────── core lock ────────────────────┐
//!   │ refresh setpoint → push sample → snapshot      │
//!   │ [last label tick]  re-run actuation policy     │
//!   │ [status tick]      emit reading                │
//!   └────┬───────────────────────────────────────────┘
//!        │
//!   render display (temperature page / mode page)
//!   [status tick] send status line
//! ```
//!
//! Two counters, both starting at 1 and reset to 1 after firing:
//! `alt_counter` pages the display (`alternate` ticks per page, actuation
//! refresh on the last mode-page tick) and `counter` drives the status
//! line every `status_period` ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::ThermostatConfig;

use super::events::AppEvent;
use super::ports::{Clock, DisplayPort, EventSink, LampPort, StatusTransport, TemperatureSensor};
use super::service::{SharedCore, TickSnapshot, lock_core};
use super::status::{clock_line, format_status, mode_line, temperature_line};

/// Longest single sleep while waiting for the next tick, so a shutdown
/// request is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Cadence parameters derived from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub tick_period: Duration,
    pub status_period: u32,
    pub alternate: u32,
}

impl LoopTiming {
    pub fn from_config(config: &ThermostatConfig) -> Self {
        Self {
            tick_period: Duration::from_millis(config.tick_period_ms),
            status_period: config.status_period_ticks.max(1),
            alternate: config.display_alternate_ticks.max(1),
        }
    }
}

/// What the display showed on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPage {
    Temperature,
    Mode,
}

/// Result of one tick, for callers that want to observe the cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub snapshot: TickSnapshot,
    pub page: DisplayPage,
    pub actuation_refreshed: bool,
    pub status_sent: bool,
}

pub struct ControlLoop<S, D, T, L, C, E> {
    core: SharedCore<L, C, E>,
    sensor: S,
    display: D,
    transport: T,
    timing: LoopTiming,
    counter: u32,
    alt_counter: u32,
}

impl<S, D, T, L, C, E> ControlLoop<S, D, T, L, C, E>
where
    S: TemperatureSensor,
    D: DisplayPort,
    T: StatusTransport,
    L: LampPort,
    C: Clock,
    E: EventSink,
{
    pub fn new(
        core: SharedCore<L, C, E>,
        sensor: S,
        display: D,
        transport: T,
        timing: LoopTiming,
    ) -> Self {
        Self {
            core,
            sensor,
            display,
            transport,
            timing,
            counter: 1,
            alt_counter: 1,
        }
    }

    /// Run until `shutdown` is set, then turn both lamps off and release
    /// the display.
    pub fn run(mut self, shutdown: &AtomicBool) {
        info!(
            "Control loop running: period={}ms status every {} ticks",
            self.timing.tick_period.as_millis(),
            self.timing.status_period
        );

        while !shutdown.load(Ordering::Acquire) {
            let started = Instant::now();
            self.tick();
            self.sleep_rest_of_tick(started, shutdown);
        }

        self.finish();
    }

    /// One iteration without the trailing sleep.
    pub fn tick(&mut self) -> TickReport {
        let sample_f = match self.sensor.read_fahrenheit() {
            Ok(f) if f.is_finite() => Some(f),
            Ok(f) => {
                warn!("sensor: discarding non-finite reading {}", f);
                None
            }
            Err(e) => {
                warn!("sensor: {}", e);
                None
            }
        };

        // Display paging.
        let half = self.timing.alternate;
        let page = if self.alt_counter <= half {
            DisplayPage::Temperature
        } else {
            DisplayPage::Mode
        };
        self.alt_counter += 1;
        let actuation_refreshed = self.alt_counter > 2 * half;
        if actuation_refreshed {
            self.alt_counter = 1;
        }

        // Status cadence.
        let status_due = self.counter % self.timing.status_period == 0;
        self.counter = if status_due { 1 } else { self.counter + 1 };

        let snapshot = {
            let mut core = lock_core(&self.core);
            let snapshot = core.on_tick(sample_f);
            if actuation_refreshed {
                core.refresh_actuation();
            }
            if status_due {
                core.record_reading(&snapshot);
            }
            snapshot
        };

        let line1 = clock_line(&snapshot.at);
        let line2 = match page {
            DisplayPage::Temperature => temperature_line(snapshot.smoothed, snapshot.setpoint),
            DisplayPage::Mode => mode_line(snapshot.mode),
        };
        if let Err(e) = self.display.render(&line1, &line2) {
            warn!("display: {}", e);
        }

        let mut status_sent = false;
        if status_due {
            let line = format_status(snapshot.mode, snapshot.smoothed, snapshot.setpoint);
            match self.transport.send(&line) {
                Ok(()) => status_sent = true,
                Err(e) => warn!("status: {}", e),
            }
        }

        TickReport {
            snapshot,
            page,
            actuation_refreshed,
            status_sent,
        }
    }

    fn sleep_rest_of_tick(&self, started: Instant, shutdown: &AtomicBool) {
        let deadline = started + self.timing.tick_period;
        loop {
            if shutdown.load(Ordering::Acquire) {
                return;
            }
            let Some(rest) = deadline.checked_duration_since(Instant::now()) else {
                return;
            };
            if rest.is_zero() {
                return;
            }
            thread::sleep(rest.min(SHUTDOWN_POLL));
        }
    }

    fn finish(&mut self) {
        {
            let mut core = lock_core(&self.core);
            core.outputs_off();
            core.emit(&AppEvent::Stopped);
        }
        self.display.release();
        info!("Control loop stopped");
    }
}

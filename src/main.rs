//! Thermostat: Main Entry Point
//!
//! Hexagonal wiring of the control core to host adapters.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Aht20 (sim bus)   PwmLamp ×2      ConsoleDisplay  LocalClock  │
//! │  (TemperatureSensor)(LampPort)     (DisplayPort)   (Clock)     │
//! │  StreamTransport   LogEventSink → PersistenceQueue → JsonlStore│
//! │  (StatusTransport) (EventSink)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │    ThermostatCore (FSM · Setpoint · MA · Policy)       │    │
//! │  │    ▲ ControlLoop thread          ▲ InputEventSink      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ConsoleInput (stdin) ── buttons + simulation knobs            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::env;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use thermostat::adapters::config_file::JsonConfigFile;
use thermostat::adapters::console::{ConsoleCommand, ConsoleInput};
use thermostat::adapters::display::{ConsoleDisplay, DisplayHandle};
use thermostat::adapters::log_sink::LogEventSink;
use thermostat::adapters::sensor::SharedSensor;
use thermostat::adapters::sim::{SimAht20Bus, SimPwmChannel, SimSensorControl, StdDelay};
use thermostat::adapters::store::{JsonlStore, PersistenceQueue, spawn_writer};
use thermostat::adapters::time::LocalClock;
use thermostat::adapters::transport::StreamTransport;
use thermostat::app::control_loop::{ControlLoop, LoopTiming};
use thermostat::app::input::InputEventSink;
use thermostat::app::ports::{ConfigPort, DisplayPort};
use thermostat::app::service::{ThermostatCore, lock_core};
use thermostat::config::ThermostatConfig;
use thermostat::drivers::aht20::Aht20;
use thermostat::drivers::lamp::PwmLamp;
use thermostat::error::Error;

const DEFAULT_CONFIG_PATH: &str = "thermostat.json";

/// Starting temperature of the simulated sensor (≈ 69.8 °F).
const SIM_START_CELSIUS: f32 = 21.0;

/// Readings printed on exit.
const RECENT_READINGS: usize = 10;

fn main() -> Result<()> {
    // ── 1. Logging ─────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Thermostat v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config (or defaults) ──────────────────────────
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let config = match JsonConfigFile::new(&config_path).load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config {} rejected ({}), using defaults", config_path, e);
            ThermostatConfig::default()
        }
    };

    // ── 3. Persistence ────────────────────────────────────────
    let (sink, writer) = if config.persistence_enabled {
        let store = JsonlStore::open(&config.data_dir)
            .with_context(|| format!("cannot open data dir {}", config.data_dir))?;
        let (queue, writer) = spawn_writer(store).context("cannot start store writer")?;
        (LogEventSink::with_store(queue), Some(writer))
    } else {
        info!("Persistence disabled");
        (LogEventSink::<PersistenceQueue>::new(), None)
    };

    // ── 4. Hardware (simulated bus + PWM) ─────────────────────
    let sim = SimSensorControl::new(SIM_START_CELSIUS);
    let mut aht20 = Aht20::new(SimAht20Bus::new(sim.clone()), StdDelay);
    if let Err(e) = aht20.init() {
        warn!("AHT20 init failed ({}), will retry on first read", e);
    }
    let sensor = SharedSensor::new(aht20);
    let red = PwmLamp::new("red", SimPwmChannel::new(), config.pulse_fade_ms);
    let blue = PwmLamp::new("blue", SimPwmChannel::new(), config.pulse_fade_ms);

    // ── 5. Core ───────────────────────────────────────────────
    let mut core = ThermostatCore::new(&config, red, blue, LocalClock::new(), sink)
        .map_err(Error::from)?;
    core.start();
    let core = core.into_shared();
    let inputs = InputEventSink::new(core.clone());

    // ── 6. Display + status transport ─────────────────────────
    let mut display = DisplayHandle::new(ConsoleDisplay::new());
    let transport = StreamTransport::open(config.status_output.as_deref().map(Path::new))
        .context("cannot open status output")?;

    // ── 7. Control loop thread ────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let control = ControlLoop::new(
        core.clone(),
        sensor,
        display.clone(),
        transport,
        LoopTiming::from_config(&config),
    );
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let loop_shutdown = shutdown.clone();
    let loop_handle = thread::Builder::new()
        .name("control-loop".into())
        .spawn(move || {
            control.run(&loop_shutdown);
            let _ = done_tx.send(());
        })
        .context("cannot start control loop")?;

    // ── 8. Console input until quit / EOF ─────────────────────
    info!("Commands: m (mode)  + / - (setpoint)  t <celsius>  x (sensor fault)  q (quit)");
    let mut console = ConsoleInput::new(io::stdin().lock());
    loop {
        match console.next_command() {
            ConsoleCommand::Input(event) => inputs.dispatch(event),
            ConsoleCommand::SetTemperature(c) => {
                sim.set_celsius(c);
                info!("Simulated temperature set to {:.1}\u{00b0}C", c);
            }
            ConsoleCommand::ToggleFault => {
                let faulted = sim.toggle_fault();
                info!("Simulated sensor fault {}", if faulted { "ON" } else { "OFF" });
            }
            ConsoleCommand::Quit => break,
        }
    }

    // ── 9. Shutdown ───────────────────────────────────────────
    info!("Cleaning up. Exiting...");
    shutdown.store(true, Ordering::Release);

    let grace = Duration::from_millis(config.shutdown_grace_ms);
    match await_loop(loop_handle, &done_rx, grace) {
        LoopExit::Stopped => {}
        LoopExit::Panicked => warn!("Control loop thread panicked, forcing outputs off"),
        LoopExit::TimedOut => warn!(
            "Control loop still running after {}ms, forcing outputs off",
            config.shutdown_grace_ms
        ),
    }
    // Both are no-ops when the loop already did them.
    display.release();
    lock_core(&core).outputs_off();

    if let Some(writer) = writer {
        match writer.stop() {
            Some(store) => print_recent_readings(&store),
            None => warn!("Store writer did not stop cleanly"),
        }
    }

    Ok(())
}

/// How the control loop thread ended after shutdown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Stopped,
    Panicked,
    TimedOut,
}

/// Wait up to `grace` for the loop's completion signal.  A panicking loop
/// drops its sender, which shows up as a disconnect, not a timeout.
fn await_loop(handle: JoinHandle<()>, done: &Receiver<()>, grace: Duration) -> LoopExit {
    match done.recv_timeout(grace) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
            if handle.join().is_ok() {
                LoopExit::Stopped
            } else {
                LoopExit::Panicked
            }
        }
        Err(RecvTimeoutError::Timeout) => LoopExit::TimedOut,
    }
}

/// Print the last few readings, best-effort.
fn print_recent_readings(store: &JsonlStore) {
    match store.recent_readings(RECENT_READINGS) {
        Ok(readings) if readings.is_empty() => println!("No readings recorded."),
        Ok(readings) => {
            println!("Last {} readings:", readings.len());
            println!("Time                | Temp  | Setpoint | State");
            for r in readings {
                let temp = r
                    .temperature
                    .map_or_else(|| "NA".to_owned(), |t| format!("{t:.1}"));
                println!("{} | {:>5} | {:>8} | {}", r.timestamp, temp, r.setpoint, r.state);
            }
        }
        Err(e) => warn!("Cannot read back readings: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_signalling<F: FnOnce() + Send + 'static>(body: F) -> (JoinHandle<()>, Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            body();
            let _ = tx.send(());
        });
        (handle, rx)
    }

    #[test]
    fn clean_stop_is_reported_as_stopped() {
        let (handle, rx) = spawn_signalling(|| {});
        assert_eq!(await_loop(handle, &rx, Duration::from_secs(5)), LoopExit::Stopped);
    }

    #[test]
    fn panicking_loop_is_reported_as_panicked() {
        let (handle, rx) = spawn_signalling(|| panic!("tick failed"));
        assert_eq!(await_loop(handle, &rx, Duration::from_secs(5)), LoopExit::Panicked);
    }

    #[test]
    fn slow_loop_times_out() {
        let (handle, rx) = spawn_signalling(|| thread::sleep(Duration::from_millis(300)));
        assert_eq!(await_loop(handle, &rx, Duration::from_millis(10)), LoopExit::TimedOut);
    }
}

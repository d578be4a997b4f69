//! Integration tests for the ControlLoop → ThermostatCore → adapters pipeline.
//!
//! Ticks are driven by hand (`ControlLoop::tick`) except for the shutdown
//! tests, which run the real loop on its own thread with a short period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::mock_hw::{
    LampCall, MockClock, MockDisplay, MockLamp, MockSensor, MockTransport, RecordingSink,
};

use thermostat::adapters::display::DisplayHandle;
use thermostat::app::control_loop::{ControlLoop, DisplayPage, LoopTiming};
use thermostat::app::events::AppEvent;
use thermostat::app::input::InputEventSink;
use thermostat::app::ports::DisplayPort;
use thermostat::app::service::{SharedCore, ThermostatCore, lock_core};
use thermostat::config::ThermostatConfig;
use thermostat::fsm::Mode;

type Core = SharedCore<MockLamp, MockClock, RecordingSink>;
type Loop<D> = ControlLoop<MockSensor, D, MockTransport, MockLamp, MockClock, RecordingSink>;

struct Rig {
    core: Core,
    control: Loop<MockDisplay>,
    sensor: MockSensor,
    display: MockDisplay,
    transport: MockTransport,
    red: MockLamp,
    blue: MockLamp,
    clock: MockClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: ThermostatConfig, fahrenheit: f32) -> Self {
        let red = MockLamp::new();
        let blue = MockLamp::new();
        let clock = MockClock::at(12, 0);
        let sink = RecordingSink::new();
        let sensor = MockSensor::reading(fahrenheit);
        let display = MockDisplay::new();
        let transport = MockTransport::new();

        let mut core = ThermostatCore::new(
            &config,
            red.clone(),
            blue.clone(),
            clock.clone(),
            sink.clone(),
        )
        .unwrap();
        core.start();
        let core = core.into_shared();

        let control = ControlLoop::new(
            core.clone(),
            sensor.clone(),
            display.clone(),
            transport.clone(),
            LoopTiming::from_config(&config),
        );

        Self {
            core,
            control,
            sensor,
            display,
            transport,
            red,
            blue,
            clock,
            sink,
        }
    }

    fn inputs(&self) -> InputEventSink<MockLamp, MockClock, RecordingSink> {
        InputEventSink::new(self.core.clone())
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.control.tick();
        }
    }
}

fn instant_window() -> ThermostatConfig {
    ThermostatConfig {
        ma_window: 1,
        ..ThermostatConfig::default()
    }
}

// ── Status cadence ────────────────────────────────────────────

#[test]
fn status_line_every_thirty_ticks() {
    let mut rig = Rig::new(ThermostatConfig::default(), 69.5);

    for n in 1..=60u32 {
        let report = rig.control.tick();
        assert_eq!(report.status_sent, n % 30 == 0, "tick {n}");
    }

    assert_eq!(rig.transport.lines(), vec!["off,69,70\n", "off,69,70\n"]);
    assert_eq!(rig.sink.readings(), 2, "one reading per status line");
}

#[test]
fn status_period_one_reports_every_tick() {
    let config = ThermostatConfig {
        status_period_ticks: 1,
        ..ThermostatConfig::default()
    };
    let mut rig = Rig::new(config, 69.5);
    rig.ticks(3);
    assert_eq!(rig.transport.lines().len(), 3);
}

// ── Display paging + actuation refresh ───────────────────────

#[test]
fn display_alternates_every_five_ticks() {
    let mut rig = Rig::new(ThermostatConfig::default(), 69.5);

    for n in 1..=20u32 {
        let report = rig.control.tick();
        let expected = if (n - 1) % 10 < 5 {
            DisplayPage::Temperature
        } else {
            DisplayPage::Mode
        };
        assert_eq!(report.page, expected, "tick {n}");
        assert_eq!(report.actuation_refreshed, n % 10 == 0, "tick {n}");
    }

    let frames = rig.display.frames();
    assert_eq!(frames.len(), 20);
    assert_eq!(frames[0].0, "01/15 12:00:00  ");
    assert_eq!(frames[0].1, "Temp:69F Set:70F");
    assert_eq!(frames[5].1, "OFF             ");
    assert!(frames.iter().all(|(a, b)| a.len() == 16 && b.len() == 16));
}

#[test]
fn lamps_only_follow_temperature_on_refresh_tick() {
    let mut rig = Rig::new(instant_window(), 60.0);
    rig.control.tick(); // tick 1
    rig.inputs().cycle_mode();
    assert_eq!(lock_core(&rig.core).mode(), Mode::Heat);
    assert_eq!(rig.red.state(), LampCall::Pulse, "60 < 70 - 1");

    rig.sensor.set(70.0);
    for n in 2..=9 {
        let report = rig.control.tick();
        assert!(!report.actuation_refreshed, "tick {n}");
        assert_eq!(rig.red.state(), LampCall::Pulse, "tick {n}");
    }

    let report = rig.control.tick(); // tick 10
    assert!(report.actuation_refreshed);
    assert_eq!(rig.red.state(), LampCall::Solid);
    assert_eq!(rig.blue.state(), LampCall::Off);
}

#[test]
fn unchanged_decision_does_not_restart_pulse() {
    let mut rig = Rig::new(instant_window(), 60.0);
    rig.control.tick();
    rig.inputs().cycle_mode();
    rig.ticks(39);
    assert_eq!(rig.red.count(LampCall::Pulse), 1);
}

#[test]
fn smoothing_averages_the_window() {
    let config = ThermostatConfig {
        ma_window: 3,
        ..ThermostatConfig::default()
    };
    let mut rig = Rig::new(config, 60.0);
    rig.control.tick();
    rig.sensor.set(66.0);
    rig.control.tick();
    rig.sensor.set(72.0);
    let report = rig.control.tick();
    assert_eq!(report.snapshot.smoothed, Some(66.0));

    rig.sensor.set(78.0);
    let report = rig.control.tick();
    assert_eq!(report.snapshot.smoothed, Some(72.0), "oldest sample dropped");
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn sensor_fault_renders_placeholders() {
    let config = ThermostatConfig {
        status_period_ticks: 1,
        ..ThermostatConfig::default()
    };
    let mut rig = Rig::new(config, 69.5);
    rig.sensor.fail();

    let report = rig.control.tick();
    assert_eq!(report.snapshot.smoothed, None);
    assert_eq!(rig.display.last_frame().unwrap().1, "Temp:--F Set:70F");
    assert_eq!(rig.transport.lines(), vec!["off,NA,70\n"]);

    let reading = rig.sink.events().into_iter().find_map(|e| match e {
        AppEvent::Reading(r) => Some(r),
        _ => None,
    });
    assert_eq!(reading.unwrap().temperature, None);

    // Recovery: the next good read smooths again.
    rig.sensor.set(71.0);
    let report = rig.control.tick();
    assert!(report.snapshot.smoothed.is_some());
}

#[test]
fn sensor_fault_in_heat_is_fail_safe_solid() {
    let mut rig = Rig::new(instant_window(), 60.0);
    rig.control.tick();
    rig.inputs().cycle_mode();
    assert_eq!(rig.red.state(), LampCall::Pulse);

    rig.sensor.fail();
    rig.ticks(8);
    assert_eq!(rig.red.state(), LampCall::Pulse, "held until refresh tick");
    rig.control.tick(); // tick 10
    assert_eq!(rig.red.state(), LampCall::Solid);
    assert_eq!(lock_core(&rig.core).smoothed(), None);
}

// ── Schedule ──────────────────────────────────────────────────

#[test]
fn schedule_boundary_changes_setpoint_on_next_tick() {
    let mut rig = Rig::new(ThermostatConfig::default(), 66.0);
    rig.clock.set(21, 59);
    assert_eq!(rig.control.tick().snapshot.setpoint, 70);

    rig.clock.set(22, 0);
    assert_eq!(rig.control.tick().snapshot.setpoint, 65);

    rig.inputs().increment();
    rig.inputs().increment();
    assert_eq!(rig.control.tick().snapshot.setpoint, 67, "offset survives");

    rig.clock.set(3, 0);
    assert_eq!(rig.control.tick().snapshot.setpoint, 67, "wraps to night entry");
}

#[test]
fn schedule_disabled_holds_initial_setpoint() {
    let config = ThermostatConfig {
        schedule_enabled: false,
        ..ThermostatConfig::default()
    };
    let mut rig = Rig::new(config, 66.0);
    rig.clock.set(23, 0);
    assert_eq!(rig.control.tick().snapshot.setpoint, 72);
}

// ── Shutdown ──────────────────────────────────────────────────

fn fast_config() -> ThermostatConfig {
    ThermostatConfig {
        ma_window: 1,
        tick_period_ms: 10,
        ..ThermostatConfig::default()
    }
}

#[test]
fn run_stops_with_lamps_off_and_display_released() {
    let rig = Rig::new(fast_config(), 60.0);
    rig.inputs().cycle_mode();
    assert_ne!(rig.red.state(), LampCall::Off);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let control = rig.control;
    let handle = thread::spawn(move || control.run(&flag));

    thread::sleep(Duration::from_millis(120));
    shutdown.store(true, Ordering::Release);
    handle.join().unwrap();

    assert_eq!(rig.red.state(), LampCall::Off);
    assert_eq!(rig.blue.state(), LampCall::Off);
    assert_eq!(rig.display.release_count(), 1);
    assert_eq!(rig.sink.events().last(), Some(&AppEvent::Stopped));
    assert!(!rig.display.frames().is_empty(), "loop ticked at least once");
}

#[test]
fn display_released_once_when_shutdown_path_also_releases() {
    let rig = Rig::new(fast_config(), 60.0);
    let mock = MockDisplay::new();
    let mut handle = DisplayHandle::new(mock.clone());
    let control: Loop<DisplayHandle<MockDisplay>> = ControlLoop::new(
        rig.core.clone(),
        rig.sensor.clone(),
        handle.clone(),
        rig.transport.clone(),
        LoopTiming::from_config(&fast_config()),
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let worker = thread::spawn(move || control.run(&flag));
    thread::sleep(Duration::from_millis(30));
    shutdown.store(true, Ordering::Release);
    worker.join().unwrap();

    handle.release();
    assert!(handle.is_released());
    assert_eq!(mock.release_count(), 1);
}

//! Integration tests for InputEventSink → ThermostatCore.
//!
//! Covers the mode cycle, manual offset, event ordering in the log, and
//! dispatch from several threads while the control loop keeps ticking.

use std::thread;

use crate::mock_hw::{
    LampCall, MockClock, MockDisplay, MockLamp, MockSensor, MockTransport, RecordingSink,
};

use thermostat::app::control_loop::{ControlLoop, LoopTiming};
use thermostat::app::events::AppEvent;
use thermostat::app::input::{InputEvent, InputEventSink};
use thermostat::app::service::{SharedCore, ThermostatCore, lock_core};
use thermostat::config::ThermostatConfig;
use thermostat::fsm::Mode;

type Core = SharedCore<MockLamp, MockClock, RecordingSink>;

fn make_core(config: &ThermostatConfig) -> (Core, MockLamp, MockLamp, RecordingSink) {
    let red = MockLamp::new();
    let blue = MockLamp::new();
    let sink = RecordingSink::new();
    let mut core = ThermostatCore::new(
        config,
        red.clone(),
        blue.clone(),
        MockClock::at(12, 0),
        sink.clone(),
    )
    .unwrap();
    core.start();
    (core.into_shared(), red, blue, sink)
}

// ── Mode cycle ────────────────────────────────────────────────

#[test]
fn mode_cycles_off_heat_cool_off() {
    let (core, red, blue, _) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core.clone());

    assert_eq!(lock_core(&core).mode(), Mode::Off);
    inputs.cycle_mode();
    assert_eq!(lock_core(&core).mode(), Mode::Heat);
    assert_eq!(red.state(), LampCall::Solid, "no reading yet, fail-safe solid");
    assert_eq!(blue.state(), LampCall::Off);

    inputs.cycle_mode();
    assert_eq!(lock_core(&core).mode(), Mode::Cool);
    assert_eq!(red.state(), LampCall::Off);
    assert_eq!(blue.state(), LampCall::Solid);

    inputs.cycle_mode();
    assert_eq!(lock_core(&core).mode(), Mode::Off);
    assert_eq!(red.state(), LampCall::Off);
    assert_eq!(blue.state(), LampCall::Off);
}

#[test]
fn input_logged_before_its_state_change() {
    let (core, _, _, sink) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core);

    inputs.cycle_mode();
    inputs.increment();
    inputs.cycle_mode();
    inputs.decrement();
    inputs.cycle_mode();

    assert_eq!(
        sink.event_types(),
        vec![
            "button:mode",
            "state_change:heat",
            "button:increase",
            "button:mode",
            "state_change:cool",
            "button:decrease",
            "button:mode",
            "state_change:off",
        ]
    );
    assert_eq!(sink.events().first(), Some(&AppEvent::Started(Mode::Off)));
}

// ── Manual offset ─────────────────────────────────────────────

#[test]
fn offset_steps_setpoint_by_one() {
    let (core, _, _, _) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core.clone());

    inputs.increment();
    inputs.increment();
    assert_eq!(lock_core(&core).setpoint(), 72);
    assert_eq!(lock_core(&core).manual_offset(), 2);

    for _ in 0..5 {
        inputs.decrement();
    }
    assert_eq!(lock_core(&core).setpoint(), 67);
    assert_eq!(lock_core(&core).base_setpoint(), 70);
}

#[test]
fn offset_is_unbounded() {
    let (core, _, _, _) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core.clone());
    for _ in 0..100 {
        inputs.decrement();
    }
    assert_eq!(lock_core(&core).setpoint(), -30);
}

#[test]
fn offset_in_off_mode_keeps_lamps_off() {
    let (core, red, blue, _) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core);
    red.clear();
    blue.clear();

    inputs.increment();
    inputs.decrement();
    assert!(red.calls().iter().all(|c| *c == LampCall::Off));
    assert!(blue.calls().iter().all(|c| *c == LampCall::Off));
}

#[test]
fn increment_in_cool_reacts_immediately() {
    let config = ThermostatConfig {
        ma_window: 1,
        ..ThermostatConfig::default()
    };
    let (core, _, blue, _) = make_core(&config);
    lock_core(&core).on_tick(Some(71.5));

    let inputs = InputEventSink::new(core);
    inputs.cycle_mode();
    inputs.cycle_mode();
    assert_eq!(blue.state(), LampCall::Pulse, "71.5 > 70 + 1");

    inputs.increment();
    assert_eq!(blue.state(), LampCall::Solid, "71.5 <= 71 + 1");
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn concurrent_inputs_are_all_applied() {
    let (core, _, _, sink) = make_core(&ThermostatConfig::default());
    let inputs = InputEventSink::new(core.clone());

    let mut control = ControlLoop::new(
        core.clone(),
        MockSensor::reading(68.0),
        MockDisplay::new(),
        MockTransport::new(),
        LoopTiming::from_config(&ThermostatConfig::default()),
    );

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let inputs = inputs.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    inputs.increment();
                }
                for _ in 0..3 {
                    inputs.dispatch(InputEvent::CycleMode);
                }
            })
        })
        .collect();

    for _ in 0..50 {
        control.tick();
    }
    for w in workers {
        w.join().unwrap();
    }

    let core = lock_core(&core);
    assert_eq!(core.manual_offset(), 100);
    assert_eq!(core.setpoint(), 170);
    // 12 cycles is a multiple of three.
    assert_eq!(core.mode(), Mode::Off);

    let changes: Vec<_> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(changes.len(), 12);
    assert!(changes.iter().all(|(from, to)| from.next() == *to));
    assert!(changes.windows(2).all(|w| w[0].1 == w[1].0), "no lost transitions");
}

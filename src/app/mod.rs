//! Application core: domain orchestration, zero direct I/O.
//!
//! The shared [`service::ThermostatCore`] holds mode, setpoint and
//! smoothing state; the [`control_loop::ControlLoop`] drives it on a fixed
//! tick and the [`input::InputEventSink`] drives it from manual controls.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without peripherals.

pub mod control_loop;
pub mod events;
pub mod input;
pub mod ports;
pub mod service;
pub mod status;

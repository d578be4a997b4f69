//! Thermostat controller library.
//!
//! Exposes the pure control logic (mode machine, schedule, smoothing,
//! hysteresis policy), the periodic control loop, and the host adapters
//! used by the `thermostat` binary.  Everything here runs on the host so
//! the whole control path can be driven from tests with mock collaborators.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;

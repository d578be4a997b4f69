//! Control algorithms: schedule lookup, setpoint resolution, smoothing and
//! the hysteresis actuation policy.  Pure logic, no I/O.

pub mod actuation;
pub mod schedule;
pub mod setpoint;
pub mod smoothing;

//! Simulated hardware for running the thermostat on a host.
//!
//! - [`SimAht20Bus`]: an `embedded-hal` I²C bus with one AHT20 on it,
//!   whose temperature and fault state are set through a [`SimSensorControl`].
//! - [`SimPwmChannel`]: an `embedded-hal` PWM channel that just stores its duty.
//! - [`StdDelay`]: `DelayNs` over `std::thread::sleep`.
//!
//! The real drivers run unchanged on top of these.

use core::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU16, Ordering};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};
use embedded_hal::pwm::{self, SetDutyCycle};
use log::debug;

use crate::drivers::aht20::{AHT20_ADDR, CMD_CALIBRATE, STATUS_CALIBRATED, encode};

// ───────────────────────────────────────────────────────────────
// Sensor control handle
// ───────────────────────────────────────────────────────────────

/// Shared knobs for the simulated sensor.
#[derive(Clone)]
pub struct SimSensorControl {
    /// Temperature in milli-°C.
    milli_celsius: Arc<AtomicI32>,
    fault: Arc<AtomicBool>,
}

impl SimSensorControl {
    pub fn new(celsius: f32) -> Self {
        Self {
            milli_celsius: Arc::new(AtomicI32::new((celsius * 1000.0) as i32)),
            fault: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_celsius(&self, celsius: f32) {
        self.milli_celsius
            .store((celsius * 1000.0) as i32, Ordering::Relaxed);
    }

    pub fn celsius(&self) -> f32 {
        self.milli_celsius.load(Ordering::Relaxed) as f32 / 1000.0
    }

    /// Flip the fault flag; returns the new state.
    pub fn toggle_fault(&self) -> bool {
        !self.fault.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.load(Ordering::Relaxed)
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated I²C bus with an AHT20
// ───────────────────────────────────────────────────────────────

pub struct SimAht20Bus {
    control: SimSensorControl,
    calibrated: bool,
}

impl SimAht20Bus {
    /// The device powers up uncalibrated, like a fresh part.
    pub fn new(control: SimSensorControl) -> Self {
        Self {
            control,
            calibrated: false,
        }
    }

    fn status(&self) -> u8 {
        if self.calibrated { STATUS_CALIBRATED } else { 0 }
    }
}

impl i2c::ErrorType for SimAht20Bus {
    type Error = ErrorKind;
}

impl I2c for SimAht20Bus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != AHT20_ADDR || self.control.is_faulted() {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if bytes.starts_with(&CMD_CALIBRATE[..1]) {
                        debug!("sim AHT20: calibrated");
                        self.calibrated = true;
                    }
                }
                Operation::Read(buf) => {
                    let frame = encode(self.control.celsius(), 45.0, self.status());
                    let n = buf.len().min(frame.len());
                    buf[..n].copy_from_slice(&frame[..n]);
                }
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated PWM channel
// ───────────────────────────────────────────────────────────────

pub const SIM_PWM_MAX: u16 = 1000;

/// PWM channel that records its duty.  Clones observe the same channel.
#[derive(Clone, Default)]
pub struct SimPwmChannel {
    duty: Arc<AtomicU16>,
}

impl SimPwmChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Relaxed)
    }
}

impl pwm::ErrorType for SimPwmChannel {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwmChannel {
    fn max_duty_cycle(&self) -> u16 {
        SIM_PWM_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.store(duty.min(SIM_PWM_MAX), Ordering::Relaxed);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Delay
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

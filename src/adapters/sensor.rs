//! Temperature sensor adapters.
//!
//! [`SharedSensor`] serialises access to a sensor whose bus may have other
//! users: the lock is held for exactly one read transaction.

use std::sync::{Arc, Mutex, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::TemperatureSensor;
use crate::drivers::aht20::Aht20;
use crate::error::SensorError;

impl<I: I2c, D: DelayNs> TemperatureSensor for Aht20<I, D> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.measure().map(|m| m.celsius)
    }
}

/// Cloneable handle; every clone reads the same device under one lock.
pub struct SharedSensor<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSensor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> SharedSensor<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sensor)),
        }
    }
}

impl<S: TemperatureSensor> TemperatureSensor for SharedSensor<S> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let mut sensor = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        sensor.read_celsius()
    }
}

//! AHT20 temperature / humidity sensor over I²C.
//!
//! Blocking driver on the `embedded-hal` 1.0 [`I2c`] and [`DelayNs`] traits.
//!
//! ```text
//!   init:     read status ─▶ not calibrated? ─▶ write BE 08 00, wait 10 ms
//!   measure:  write AC 33 00 ─▶ wait 80 ms ─▶ read 6 bytes
//!
//!   byte  0        1        2        3         4        5
//!        status   hum[19:12] hum[11:4] hum[3:0]|tmp[19:16] tmp[15:8] tmp[7:0]
//!
//!   T(°C) = raw / 2^20 × 200 − 50      RH(%) = raw / 2^20 × 100
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::error::SensorError;

/// Fixed 7-bit bus address.
pub const AHT20_ADDR: u8 = 0x38;

pub const CMD_CALIBRATE: [u8; 3] = [0xBE, 0x08, 0x00];
pub const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

pub const STATUS_BUSY: u8 = 0x80;
pub const STATUS_CALIBRATED: u8 = 0x08;

const POWER_ON_MS: u32 = 40;
const CALIBRATE_MS: u32 = 10;
const CONVERSION_MS: u32 = 80;

/// Full scale of the 20-bit raw fields.
const RAW_SCALE: f32 = (1u32 << 20) as f32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aht20Measurement {
    pub celsius: f32,
    pub humidity_percent: f32,
}

pub struct Aht20<I, D> {
    i2c: I,
    delay: D,
    calibrated: bool,
}

impl<I: I2c, D: DelayNs> Aht20<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            calibrated: false,
        }
    }

    /// Wait for power-on, then calibrate if the device asks for it.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.delay.delay_ms(POWER_ON_MS);
        if self.status()? & STATUS_CALIBRATED == 0 {
            debug!("AHT20: calibrating");
            self.write(&CMD_CALIBRATE)?;
            self.delay.delay_ms(CALIBRATE_MS);
            if self.status()? & STATUS_CALIBRATED == 0 {
                return Err(SensorError::NotCalibrated);
            }
        }
        self.calibrated = true;
        Ok(())
    }

    /// Trigger one conversion and read it back.
    pub fn measure(&mut self) -> Result<Aht20Measurement, SensorError> {
        if !self.calibrated {
            self.init()?;
        }

        self.write(&CMD_TRIGGER)?;
        self.delay.delay_ms(CONVERSION_MS);

        let mut buf = [0u8; 6];
        self.i2c.read(AHT20_ADDR, &mut buf).map_err(|e| {
            warn!("AHT20 read failed: {:?}", e);
            SensorError::Bus
        })?;

        if buf[0] & STATUS_BUSY != 0 {
            return Err(SensorError::Busy);
        }
        if buf[0] & STATUS_CALIBRATED == 0 {
            // Device was reset behind our back; recalibrate next time.
            self.calibrated = false;
            return Err(SensorError::NotCalibrated);
        }

        Ok(decode(&buf))
    }

    /// Release the bus and delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn status(&mut self) -> Result<u8, SensorError> {
        let mut status = [0u8; 1];
        self.i2c.read(AHT20_ADDR, &mut status).map_err(|e| {
            warn!("AHT20 status read failed: {:?}", e);
            SensorError::Bus
        })?;
        Ok(status[0])
    }

    fn write(&mut self, cmd: &[u8]) -> Result<(), SensorError> {
        self.i2c.write(AHT20_ADDR, cmd).map_err(|e| {
            warn!("AHT20 write failed: {:?}", e);
            SensorError::Bus
        })
    }
}

/// Decode a 6-byte measurement frame.
pub fn decode(buf: &[u8; 6]) -> Aht20Measurement {
    let raw_hum = (u32::from(buf[1]) << 12) | (u32::from(buf[2]) << 4) | (u32::from(buf[3]) >> 4);
    let raw_temp =
        ((u32::from(buf[3]) & 0x0F) << 16) | (u32::from(buf[4]) << 8) | u32::from(buf[5]);

    Aht20Measurement {
        celsius: raw_temp as f32 / RAW_SCALE * 200.0 - 50.0,
        humidity_percent: raw_hum as f32 / RAW_SCALE * 100.0,
    }
}

/// Encode a measurement frame (inverse of [`decode`]); used by simulated buses.
pub fn encode(celsius: f32, humidity_percent: f32, status: u8) -> [u8; 6] {
    let max = (1u32 << 20) - 1;
    let raw_temp = (((celsius + 50.0) / 200.0 * RAW_SCALE).round().max(0.0) as u32).min(max);
    let raw_hum = ((humidity_percent / 100.0 * RAW_SCALE).round().max(0.0) as u32).min(max);

    [
        status,
        (raw_hum >> 12) as u8,
        (raw_hum >> 4) as u8,
        (((raw_hum & 0x0F) << 4) | (raw_temp >> 16)) as u8,
        (raw_temp >> 8) as u8,
        raw_temp as u8,
    ]
}

//! PWM lamp driver with a background pulse.
//!
//! Drives one lamp through an `embedded-hal` [`SetDutyCycle`] channel.
//! `pulse()` starts a worker thread that ramps the duty 0 → full → 0
//! (triangular, `fade_ms` each way) until the next `off()`/`solid()`/
//! `pulse()` call stops it.
//!
//! | Output | Duty                                  |
//! |--------|---------------------------------------|
//! | off    | 0                                     |
//! | solid  | max                                   |
//! | pulse  | triangular ramp, period 2 × `fade_ms` |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::app::ports::LampPort;
use crate::error::ActuatorError;

/// Duty update interval while pulsing (50 Hz).
const PULSE_STEP: Duration = Duration::from_millis(20);

/// Brightness 0–255 on a triangular ramp: 0 → 255 over the first half of
/// `period_ms`, back to 0 over the second.
pub fn pulse_brightness(phase_ms: u32, period_ms: u32) -> u8 {
    let period = u64::from(period_ms.max(2));
    let pos = u64::from(phase_ms) % period;
    let half = period / 2;
    if pos < half {
        ((pos * 255) / half) as u8
    } else {
        (((period - pos) * 255) / half).min(255) as u8
    }
}

struct PulseTask {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct PwmLamp<P> {
    name: &'static str,
    channel: Arc<Mutex<P>>,
    fade_ms: u32,
    pulse: Option<PulseTask>,
}

fn lock_channel<P>(channel: &Mutex<P>) -> MutexGuard<'_, P> {
    channel.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P> PwmLamp<P>
where
    P: SetDutyCycle + Send + 'static,
{
    pub fn new(name: &'static str, channel: P, fade_ms: u32) -> Self {
        Self {
            name,
            channel: Arc::new(Mutex::new(channel)),
            fade_ms: fade_ms.max(1),
            pulse: None,
        }
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_some()
    }

    fn stop_pulse(&mut self) {
        if let Some(task) = self.pulse.take() {
            task.stop.store(true, Ordering::Release);
            if task.handle.join().is_err() {
                warn!("{} lamp: pulse worker panicked", self.name);
            }
        }
    }

    fn set_full(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.stop_pulse();
        let mut ch = lock_channel(&self.channel);
        let result = if on {
            ch.set_duty_cycle_fully_on()
        } else {
            ch.set_duty_cycle_fully_off()
        };
        result.map_err(|e| {
            warn!("{} lamp: duty write failed: {:?}", self.name, e);
            ActuatorError::PwmWriteFailed
        })
    }
}

impl<P> LampPort for PwmLamp<P>
where
    P: SetDutyCycle + Send + 'static,
{
    fn off(&mut self) -> Result<(), ActuatorError> {
        debug!("{} lamp: off", self.name);
        self.set_full(false)
    }

    fn solid(&mut self) -> Result<(), ActuatorError> {
        debug!("{} lamp: solid", self.name);
        self.set_full(true)
    }

    fn pulse(&mut self) -> Result<(), ActuatorError> {
        debug!("{} lamp: pulse", self.name);
        self.set_full(false)?;

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();
        let channel = self.channel.clone();
        let period_ms = self.fade_ms.saturating_mul(2);
        let name = self.name;

        let handle = thread::Builder::new()
            .name(format!("{name}-pulse"))
            .spawn(move || {
                let started = Instant::now();
                while !worker_stop.load(Ordering::Acquire) {
                    let phase = started.elapsed().as_millis() as u32;
                    let level = pulse_brightness(phase, period_ms);
                    if let Err(e) = lock_channel(&channel).set_duty_cycle_fraction(u16::from(level), 255) {
                        warn!("{name} lamp: pulse duty write failed: {e:?}");
                        break;
                    }
                    thread::sleep(PULSE_STEP);
                }
            })
            .map_err(|_| ActuatorError::PulseSpawnFailed)?;

        self.pulse = Some(PulseTask { stop, handle });
        Ok(())
    }
}

impl<P> Drop for PwmLamp<P> {
    fn drop(&mut self) {
        if let Some(task) = self.pulse.take() {
            task.stop.store(true, Ordering::Release);
            let _ = task.handle.join();
        }
    }
}

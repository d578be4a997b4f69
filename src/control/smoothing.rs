//! Bounded moving average.
//!
//! Fixed-capacity ring of the last `window` samples with an incrementally
//! maintained sum, so each push is O(1) and allocation-free.  The sum is
//! kept in `f64` so add/evict rounding stays far below display resolution
//! over months of 1 Hz samples.

use heapless::Deque;

use crate::config::MAX_MA_WINDOW;

#[derive(Debug, Clone)]
pub struct MovingAverage {
    samples: Deque<f32, MAX_MA_WINDOW>,
    window: usize,
    sum: f64,
}

impl MovingAverage {
    /// `window` is clamped to `1..=MAX_MA_WINDOW`; config validation rejects
    /// anything outside that range before it gets here.
    pub fn new(window: usize) -> Self {
        Self {
            samples: Deque::new(),
            window: window.clamp(1, MAX_MA_WINDOW),
            sum: 0.0,
        }
    }

    /// Append `x`, evict the oldest sample if over the window, return the mean.
    pub fn push(&mut self, x: f32) -> f32 {
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= f64::from(old);
            }
        }
        // Cannot fail: len < window <= capacity after the eviction above.
        let _ = self.samples.push_back(x);
        self.sum += f64::from(x);
        self.mean()
    }

    /// Current mean, `None` before the first sample.
    pub fn value(&self) -> Option<f32> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.mean())
        }
    }

    fn mean(&self) -> f32 {
        (self.sum / self.samples.len() as f64) as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

//! Wall-clock adapter.
//!
//! The schedule and the display both work in local time.

use chrono::{Local, NaiveDateTime};

use crate::app::ports::Clock;

/// System local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl LocalClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

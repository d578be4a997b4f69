//! Effective setpoint = schedule base + manual offset.
//!
//! The base is re-resolved from the [`ScheduleTable`] on every refresh
//! because the time of day moves on; the effective value is recomputed in
//! the same call so no caller ever observes a stale combination.

use log::debug;

use super::schedule::ScheduleTable;

pub struct SetpointResolver {
    schedule: Option<ScheduleTable>,
    base: i32,
    manual_offset: i32,
    effective: i32,
}

impl SetpointResolver {
    /// `schedule = None` (or an empty table) holds the base at `initial`.
    pub fn new(initial: i32, schedule: Option<ScheduleTable>) -> Self {
        Self {
            schedule: schedule.filter(|s| !s.is_empty()),
            base: initial,
            manual_offset: 0,
            effective: initial,
        }
    }

    /// Re-resolve the base for `minute_of_day` and recompute the effective setpoint.
    pub fn refresh(&mut self, minute_of_day: u16) -> i32 {
        if let Some(base) = self.schedule.as_ref().and_then(|s| s.lookup(minute_of_day)) {
            self.base = base;
        }
        self.effective = self.base + self.manual_offset;
        debug!(
            "setpoint: base={} offset={} effective={}",
            self.base, self.manual_offset, self.effective
        );
        self.effective
    }

    /// Apply a manual step (+1 / -1) and refresh for `minute_of_day`.
    pub fn adjust(&mut self, delta: i32, minute_of_day: u16) -> i32 {
        self.manual_offset = self.manual_offset.saturating_add(delta);
        self.refresh(minute_of_day)
    }

    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn manual_offset(&self) -> i32 {
        self.manual_offset
    }

    pub fn effective(&self) -> i32 {
        self.effective
    }

    pub fn schedule_enabled(&self) -> bool {
        self.schedule.is_some()
    }
}

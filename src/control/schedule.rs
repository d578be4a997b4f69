//! Time-of-day schedule table.
//!
//! A sorted list of `(minute_of_day, base_setpoint)` pairs.  Lookup picks
//! the last entry whose start is at or before the current minute; before the
//! first entry of the day the previous day's last entry is still in force.
//!
//! ```text
//!   00:00 ───────── 06:00 ─────────────── 22:00 ───── 24:00
//!   │  65 (wrap)  │        70            │     65     │
//! ```

use heapless::Vec;

use crate::config::ScheduleEntryConfig;
use crate::error::ConfigError;

/// Upper bound on schedule entries.
pub const MAX_SCHEDULE_ENTRIES: usize = 24;

/// Minutes in a day; valid minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Parse "HH:MM" (one- or two-digit hour) into minutes since midnight.
pub fn parse_hhmm(s: &str) -> Option<u16> {
    let (h, m) = s.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let h: u16 = h.parse().ok()?;
    let m: u16 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

/// Immutable, sorted time-of-day → base-setpoint lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTable {
    /// Strictly increasing by minute.
    entries: Vec<(u16, i32), MAX_SCHEDULE_ENTRIES>,
}

impl ScheduleTable {
    /// Build from `(minute_of_day, setpoint)` pairs in any order.
    pub fn new(pairs: &[(u16, i32)]) -> Result<Self, ConfigError> {
        let mut entries: Vec<(u16, i32), MAX_SCHEDULE_ENTRIES> = Vec::new();
        for &(minute, setpoint) in pairs {
            if minute >= MINUTES_PER_DAY {
                return Err(ConfigError::ValidationFailed(
                    "schedule minute out of range",
                ));
            }
            entries
                .push((minute, setpoint))
                .map_err(|_| ConfigError::ValidationFailed("schedule holds at most 24 entries"))?;
        }

        entries.sort_unstable_by_key(|&(minute, _)| minute);
        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(ConfigError::ValidationFailed(
                "duplicate schedule start time",
            ));
        }

        Ok(Self { entries })
    }

    /// Build from the config file representation.
    pub fn from_config(entries: &[ScheduleEntryConfig]) -> Result<Self, ConfigError> {
        let mut pairs: Vec<(u16, i32), MAX_SCHEDULE_ENTRIES> = Vec::new();
        for entry in entries {
            let minute = parse_hhmm(&entry.start)
                .ok_or(ConfigError::ValidationFailed("schedule start must be HH:MM"))?;
            pairs
                .push((minute, entry.setpoint))
                .map_err(|_| ConfigError::ValidationFailed("schedule holds at most 24 entries"))?;
        }
        Self::new(&pairs)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Base setpoint in force at `minute` (minutes since midnight).
    ///
    /// Binary search for the greatest start `<= minute`; wraps to the last
    /// entry when `minute` precedes the first.  `None` only for an empty table.
    pub fn lookup(&self, minute: u16) -> Option<i32> {
        // Number of entries with start <= minute.
        let idx = self.entries.partition_point(|&(start, _)| start <= minute);
        match idx.checked_sub(1) {
            Some(i) => Some(self.entries[i].1),
            None => self.entries.last().map(|&(_, sp)| sp),
        }
    }
}

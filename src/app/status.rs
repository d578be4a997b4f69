//! Display and status-line formatting.
//!
//! ```text
//!   display  ┌────────────────┐
//!   line 1   │01/15 07:05:09  │  local date/time
//!   line 2   │Temp:69F Set:70F│  or  │HEAT            │
//!            └────────────────┘
//!   status   "heat,69,70\n"     mode,floor(°F)|NA,setpoint
//! ```

use core::fmt::Write;

use chrono::NaiveDateTime;
use heapless::String;

use crate::fsm::Mode;

/// Characters per display line.
pub const DISPLAY_WIDTH: usize = 16;

/// One fitted display line: exactly [`DISPLAY_WIDTH`] ASCII characters.
pub type DisplayLine = String<DISPLAY_WIDTH>;

/// One status line, newline-terminated.
pub type StatusLine = String<32>;

/// Left-justify `text`, truncating or space-padding to the display width.
/// Non-ASCII characters become `?` (the panel has no glyphs for them).
pub fn fit_line(text: &str) -> DisplayLine {
    let mut line = DisplayLine::new();
    for ch in text.chars().take(DISPLAY_WIDTH) {
        let ch = if ch.is_ascii() && !ch.is_ascii_control() {
            ch
        } else {
            '?'
        };
        // ASCII only, so one byte per char and never past capacity.
        let _ = line.push(ch);
    }
    while line.len() < DISPLAY_WIDTH {
        let _ = line.push(' ');
    }
    line
}

/// Line 1: `MM/DD HH:MM:SS`.
pub fn clock_line(at: &NaiveDateTime) -> DisplayLine {
    fit_line(&at.format("%m/%d %H:%M:%S").to_string())
}

/// Line 2, temperature page: `Temp:{t}F Set:{sp}F`, `--` without a reading.
pub fn temperature_line(smoothed: Option<f32>, setpoint: i32) -> DisplayLine {
    let mut text: String<40> = String::new();
    let _ = match smoothed {
        Some(t) => write!(text, "Temp:{}F Set:{}F", floor_f(t), setpoint),
        None => write!(text, "Temp:--F Set:{}F", setpoint),
    };
    fit_line(&text)
}

/// Line 2, mode page: the upper-case mode label.
pub fn mode_line(mode: Mode) -> DisplayLine {
    fit_line(mode.display_label())
}

/// `"{mode},{floor(temp)|NA},{setpoint}\n"`.
pub fn format_status(mode: Mode, smoothed: Option<f32>, setpoint: i32) -> StatusLine {
    let mut line = StatusLine::new();
    // Longest possible line is 29 bytes.
    let _ = match smoothed {
        Some(t) => write!(line, "{},{},{}\n", mode.label(), floor_f(t), setpoint),
        None => write!(line, "{},NA,{}\n", mode.label(), setpoint),
    };
    line
}

fn floor_f(t: f32) -> i32 {
    t.floor() as i32
}

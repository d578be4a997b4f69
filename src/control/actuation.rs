//! Hysteresis actuation policy.
//!
//! ```text
//!   Heat:   temp < sp − H  → Pulsing(Red)    (far below, working hard)
//!           otherwise      → Solid(Red)
//!   Cool:   temp > sp + H  → Pulsing(Blue)   (far above, working hard)
//!           otherwise      → Solid(Blue)
//!   no reading             → Solid(mode lamp)
//!   Off                    → OffBoth
//! ```

use crate::fsm::Mode;

/// The two physical lamps, one per active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LampId {
    Red = 0,
    Blue = 1,
}

impl LampId {
    pub const COUNT: usize = 2;
    pub const ALL: [LampId; Self::COUNT] = [LampId::Red, LampId::Blue];

    /// Lamp driven by `mode`, `None` for `Off`.
    pub fn for_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Off => None,
            Mode::Heat => Some(Self::Red),
            Mode::Cool => Some(Self::Blue),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

/// Output instruction for both lamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationDecision {
    OffBoth,
    Solid(LampId),
    Pulsing(LampId),
}

impl ActuationDecision {
    /// The lamp this decision energises, if any.
    pub fn lamp(self) -> Option<LampId> {
        match self {
            Self::OffBoth => None,
            Self::Solid(l) | Self::Pulsing(l) => Some(l),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActuationPolicy {
    hysteresis: f32,
}

impl ActuationPolicy {
    /// Negative bands are treated as zero.
    pub fn new(hysteresis: f32) -> Self {
        Self {
            hysteresis: hysteresis.max(0.0),
        }
    }

    pub fn hysteresis(&self) -> f32 {
        self.hysteresis
    }

    pub fn decide(&self, mode: Mode, temp_f: Option<f32>, setpoint: i32) -> ActuationDecision {
        let Some(lamp) = LampId::for_mode(mode) else {
            return ActuationDecision::OffBoth;
        };
        // Fail-safe: without a reading the band cannot be asserted.
        let Some(temp) = temp_f else {
            return ActuationDecision::Solid(lamp);
        };

        let sp = setpoint as f32;
        let far = match mode {
            Mode::Heat => temp < sp - self.hysteresis,
            Mode::Cool => temp > sp + self.hysteresis,
            Mode::Off => false,
        };

        if far {
            ActuationDecision::Pulsing(lamp)
        } else {
            ActuationDecision::Solid(lamp)
        }
    }
}

//! Uncommitted lamp output written by FSM handlers.
//!
//! Handlers never touch hardware.  They mark lamps to quiesce and request a
//! fresh actuation decision; the core applies the plan once the transition
//! has completed.

use crate::control::actuation::LampId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputPlan {
    /// Lamps to switch fully off, indexed by `LampId as usize`.
    quiesce: [bool; LampId::COUNT],
    /// Re-run the actuation policy after the quiesce step.
    recompute: bool,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiesce(&mut self, lamp: LampId) {
        self.quiesce[lamp as usize] = true;
    }

    pub fn quiesce_all(&mut self) {
        self.quiesce = [true; LampId::COUNT];
    }

    pub fn request_recompute(&mut self) {
        self.recompute = true;
    }

    pub fn is_quiesced(&self, lamp: LampId) -> bool {
        self.quiesce[lamp as usize]
    }

    pub fn needs_recompute(&self) -> bool {
        self.recompute
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Hand the pending plan to the caller and reset to empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

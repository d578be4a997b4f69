//! Concrete mode handler functions and table builder.
//!
//! Each mode is defined by plain `fn` pointers.  Every handler only sets
//! flags on the [`OutputPlan`], so running one twice is the same as once.
//!
//! ```text
//!   exit HEAT  → quiesce red
//!   exit COOL  → quiesce blue
//!   enter OFF  → quiesce red + blue
//!   enter HEAT → recompute actuation
//!   enter COOL → recompute actuation
//! ```

use super::context::OutputPlan;
use super::{Mode, StateDescriptor};
use crate::control::actuation::LampId;
use log::debug;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    [
        // Index 0: Off
        StateDescriptor {
            id: Mode::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
        },
        // Index 1: Heat
        StateDescriptor {
            id: Mode::Heat,
            name: "Heat",
            on_enter: Some(heat_enter),
            on_exit: Some(heat_exit),
        },
        // Index 2: Cool
        StateDescriptor {
            id: Mode::Cool,
            name: "Cool",
            on_enter: Some(cool_enter),
            on_exit: Some(cool_exit),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

pub fn off_enter(plan: &mut OutputPlan) {
    plan.quiesce_all();
    debug!("OFF: both lamps off");
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEAT
// ═══════════════════════════════════════════════════════════════════════════

pub fn heat_enter(plan: &mut OutputPlan) {
    plan.request_recompute();
    debug!("HEAT: recompute requested");
}

pub fn heat_exit(plan: &mut OutputPlan) {
    plan.quiesce(LampId::Red);
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOL
// ═══════════════════════════════════════════════════════════════════════════

pub fn cool_enter(plan: &mut OutputPlan) {
    plan.request_recompute();
    debug!("COOL: recompute requested");
}

pub fn cool_exit(plan: &mut OutputPlan) {
    plan.quiesce(LampId::Blue);
}

//! Function-pointer finite state machine for the thermostat mode.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  StateTable                              │
//! │  ┌───────┬───────────┬──────────┐        │
//! │  │ Mode  │ on_enter  │ on_exit  │        │
//! │  ├───────┼───────────┼──────────┤        │
//! │  │ Off   │ fn(plan)  │ -        │        │
//! │  │ Heat  │ fn(plan)  │ fn(plan) │        │
//! │  │ Cool  │ fn(plan)  │ fn(plan) │        │
//! │  └───────┴───────────┴──────────┘        │
//! └──────────────────────────────────────────┘
//!
//!        ┌──── cycle ────┐
//!        ▼               │
//!       OFF ──▶ HEAT ──▶ COOL
//! ```
//!
//! Unlike a sensor-driven machine there is no per-tick update: the only
//! transition is the external mode-cycle event.  Handlers write into an
//! [`OutputPlan`] which the caller commits to the lamps afterwards.

pub mod context;
pub mod states;

use context::OutputPlan;
use log::info;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Operating mode.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Off = 0,
    Heat = 1,
    Cool = 2,
}

impl Mode {
    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert a table index back to `Mode`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Self::Heat,
            2 => Self::Cool,
            _ => {
                debug_assert!(idx == 0, "invalid mode index: {idx}");
                Self::Off
            }
        }
    }

    /// The single legal successor: Off → Heat → Cool → Off.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Heat,
            Self::Heat => Self::Cool,
            Self::Cool => Self::Off,
        }
    }

    /// Lower-case label used on the status line and in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
        }
    }

    /// Upper-case label for the display.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
        }
    }
}

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These must be idempotent; they only touch the uncommitted plan.
pub type StateActionFn = fn(&mut OutputPlan);

/// Static descriptor for a single mode.
pub struct StateDescriptor {
    pub id: Mode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `Mode as usize`.
    table: [StateDescriptor; Mode::COUNT],
    current: usize,
    /// Completed transitions since construction.
    transitions: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; Mode::COUNT], initial: Mode) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting mode.
    pub fn start(&mut self, plan: &mut OutputPlan) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(plan);
        }
    }

    /// Advance to the next mode in the cycle.  Returns `(from, to)`.
    pub fn cycle(&mut self, plan: &mut OutputPlan) -> (Mode, Mode) {
        let from = self.current_mode();
        let to = from.next();
        self.transition(to, plan);
        (from, to)
    }

    /// Move to `next`, which must be the cycle successor of the current mode.
    ///
    /// # Panics
    ///
    /// Any other target is a programming error and panics.
    pub fn transition(&mut self, next: Mode, plan: &mut OutputPlan) {
        let current = self.current_mode();
        assert!(
            next == current.next(),
            "illegal mode transition: {} -> {}",
            current.label(),
            next.label()
        );

        let next_idx = next as usize;
        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(plan);
        }

        self.current = next_idx;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(plan);
        }
    }

    pub fn current_mode(&self) -> Mode {
        Mode::from_index(self.current)
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

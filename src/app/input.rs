//! Inbound manual input events.
//!
//! Three physical controls map to three events.  An [`InputEventSink`] is a
//! cloneable handle the input source calls from its own thread; each event
//! is applied synchronously under the core's lock, so an event applied
//! before tick N's refresh is visible to tick N.

use log::info;

use super::ports::{Clock, EventSink, LampPort};
use super::service::{SharedCore, lock_core};

/// Events that the input source can fire into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Advance Off → Heat → Cool → Off.
    CycleMode,
    /// Manual offset +1 °F.
    Increment,
    /// Manual offset −1 °F.
    Decrement,
}

impl InputEvent {
    /// Event-log type string.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::CycleMode => "button:mode",
            Self::Increment => "button:increase",
            Self::Decrement => "button:decrease",
        }
    }
}

/// Handle that applies input events against the shared core.
pub struct InputEventSink<L, C, E> {
    core: SharedCore<L, C, E>,
}

impl<L, C, E> Clone for InputEventSink<L, C, E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<L: LampPort, C: Clock, E: EventSink> InputEventSink<L, C, E> {
    pub fn new(core: SharedCore<L, C, E>) -> Self {
        Self { core }
    }

    pub fn dispatch(&self, event: InputEvent) {
        info!("Input: {}", event.event_type());
        lock_core(&self.core).handle_input(event);
    }

    pub fn cycle_mode(&self) {
        self.dispatch(InputEvent::CycleMode);
    }

    pub fn increment(&self) {
        self.dispatch(InputEvent::Increment);
    }

    pub fn decrement(&self) {
        self.dispatch(InputEvent::Decrement);
    }
}

//! Display adapters.
//!
//! [`ConsoleDisplay`] stands in for the two-line character LCD on a host:
//! it logs each changed frame under the `lcd` target.  [`DisplayHandle`]
//! makes the release happen exactly once, whichever of the control loop or
//! the shutdown path gets there first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::app::ports::DisplayPort;
use crate::app::status::DisplayLine;
use crate::error::DisplayError;

/// Host stand-in for the 16×2 panel.
#[derive(Default)]
pub struct ConsoleDisplay {
    last: Option<(DisplayLine, DisplayLine)>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayPort for ConsoleDisplay {
    fn render(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        let frame = (
            DisplayLine::try_from(line1).map_err(|_| DisplayError::WriteFailed)?,
            DisplayLine::try_from(line2).map_err(|_| DisplayError::WriteFailed)?,
        );
        if self.last.as_ref() != Some(&frame) {
            info!(target: "lcd", "|{}|{}|", frame.0, frame.1);
            self.last = Some(frame);
        }
        Ok(())
    }

    fn release(&mut self) {
        self.last = None;
        info!(target: "lcd", "display cleared");
    }
}

/// Shared, release-once wrapper around a display.
pub struct DisplayHandle<D> {
    inner: Arc<Mutex<Option<D>>>,
}

impl<D> Clone for DisplayHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: DisplayPort> DisplayHandle<D> {
    pub fn new(display: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(display))),
        }
    }

    pub fn is_released(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: DisplayPort> DisplayPort for DisplayHandle<D> {
    fn render(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        match self.lock().as_mut() {
            Some(display) => display.render(line1, line2),
            None => Err(DisplayError::Released),
        }
    }

    /// Release the wrapped display if nobody has yet.  Later calls are no-ops.
    fn release(&mut self) {
        let taken = self.lock().take();
        match taken {
            Some(mut display) => display.release(),
            None => debug!("display already released"),
        }
    }
}

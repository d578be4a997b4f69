//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, and (optionally) forwarding the ones that belong in
//! the reading/event tables to a [`ReadingStore`].  Store failures are
//! logged and otherwise ignored.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ReadingStore};

/// Adapter that logs every [`AppEvent`] and persists the durable ones.
pub struct LogEventSink<S> {
    store: Option<S>,
}

impl<S: ReadingStore> LogEventSink<S> {
    /// Log only.
    pub fn new() -> Self {
        Self { store: None }
    }

    /// Log and persist.
    pub fn with_store(store: S) -> Self {
        Self { store: Some(store) }
    }

    fn persist(&mut self, event: &AppEvent) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let result = match event {
            AppEvent::Reading(r) => store.log_reading(r),
            other => match other.to_event_record() {
                Some(record) => store.log_event(&record),
                None => Ok(()),
            },
        };
        if let Err(e) = result {
            warn!("persistence: {}", e);
        }
    }
}

impl<S: ReadingStore> Default for LogEventSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ReadingStore> EventSink for LogEventSink<S> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode.label());
            }
            AppEvent::Input { event, .. } => {
                info!("INPUT | {}", event.event_type());
            }
            AppEvent::ModeChanged { from, to, .. } => {
                info!("MODE  | {} -> {}", from.label(), to.label());
            }
            AppEvent::Reading(r) => {
                debug!(
                    "READ  | {} | temp={} | set={} | {}",
                    r.timestamp,
                    r.temperature
                        .map_or_else(|| "NA".to_owned(), |t| format!("{t:.1}")),
                    r.setpoint,
                    r.state
                );
            }
            AppEvent::Stopped => {
                info!("STOP  | outputs off");
            }
        }
        self.persist(event);
    }
}

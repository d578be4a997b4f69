//! Thermostat core, the hexagonal centre.
//!
//! [`ThermostatCore`] owns every piece of shared mutable state: the mode
//! machine, the setpoint resolver, the smoothing filter, and the lamps.
//! Both the periodic [`ControlLoop`](super::control_loop::ControlLoop) and
//! the [`InputEventSink`](super::input::InputEventSink) reach it through a
//! single mutex ([`SharedCore`]), so mode, offset and setpoint are always
//! observed together.
//!
//! ```text
//!  InputEventSink ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                     │        ThermostatCore         │
//!  ControlLoop    ──▶ │ FSM · Setpoint · MA · Policy  │ ──▶ LampPort ×2
//!                     └──────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::config::ThermostatConfig;
use crate::control::actuation::{ActuationDecision, ActuationPolicy, LampId};
use crate::control::schedule::ScheduleTable;
use crate::control::setpoint::SetpointResolver;
use crate::control::smoothing::MovingAverage;
use crate::error::ConfigError;
use crate::fsm::context::OutputPlan;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Mode};

use super::events::{AppEvent, ReadingRecord};
use super::input::InputEvent;
use super::ports::{Clock, EventSink, LampPort, minute_of_day};

/// The core behind its one lock, shared by the loop and the input context.
pub type SharedCore<L, C, E> = Arc<Mutex<ThermostatCore<L, C, E>>>;

/// Lock the core.  A panic while holding the lock does not wedge the
/// thermostat: the state inside is still consistent between operations.
pub fn lock_core<L, C, E>(core: &Mutex<ThermostatCore<L, C, E>>) -> MutexGuard<'_, ThermostatCore<L, C, E>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

// ───────────────────────────────────────────────────────────────
// Tick snapshot
// ───────────────────────────────────────────────────────────────

/// Everything one tick needs to render and report, captured under the lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    pub at: NaiveDateTime,
    pub mode: Mode,
    /// Smoothed °F for this tick; `None` if this tick's read failed.
    pub smoothed: Option<f32>,
    pub setpoint: i32,
}

// ───────────────────────────────────────────────────────────────
// ThermostatCore
// ───────────────────────────────────────────────────────────────

pub struct ThermostatCore<L, C, E> {
    fsm: Fsm,
    plan: OutputPlan,
    resolver: SetpointResolver,
    filter: MovingAverage,
    policy: ActuationPolicy,
    /// Indexed by `LampId as usize`.
    lamps: [L; LampId::COUNT],
    /// Decision currently driving the lamps.
    applied: ActuationDecision,
    /// Smoothed value from the most recent tick.
    smoothed: Option<f32>,
    clock: C,
    sink: E,
}

impl<L: LampPort, C: Clock, E: EventSink> ThermostatCore<L, C, E> {
    /// Build the core from configuration.  Does **not** start the mode
    /// machine; call [`start`](Self::start) next.
    pub fn new(
        config: &ThermostatConfig,
        red: L,
        blue: L,
        clock: C,
        sink: E,
    ) -> Result<Self, ConfigError> {
        let schedule = if config.schedule_enabled {
            Some(ScheduleTable::from_config(&config.schedule)?)
        } else {
            None
        };

        Ok(Self {
            fsm: Fsm::new(build_state_table(), Mode::Off),
            plan: OutputPlan::new(),
            resolver: SetpointResolver::new(config.initial_setpoint, schedule),
            filter: MovingAverage::new(config.ma_window),
            policy: ActuationPolicy::new(config.hysteresis_f),
            lamps: [red, blue],
            applied: ActuationDecision::OffBoth,
            smoothed: None,
            clock,
            sink,
        })
    }

    /// Wrap in the shared handle used by the loop and the input sink.
    pub fn into_shared(self) -> SharedCore<L, C, E> {
        Arc::new(Mutex::new(self))
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial mode (Off), drive both lamps off, resolve the
    /// first setpoint.
    pub fn start(&mut self) {
        self.fsm.start(&mut self.plan);
        self.commit_plan();
        let minute = self.clock.minute_of_day();
        self.resolver.refresh(minute);
        self.sink.emit(&AppEvent::Started(self.fsm.current_mode()));
        info!(
            "Thermostat started: mode={} setpoint={}",
            self.fsm.current_mode().label(),
            self.resolver.effective()
        );
    }

    /// Drive both lamps off.  Used on shutdown.
    pub fn outputs_off(&mut self) {
        self.all_off();
        self.applied = ActuationDecision::OffBoth;
    }

    // ── Manual input ──────────────────────────────────────────

    /// Apply one input event synchronously.
    pub fn handle_input(&mut self, event: InputEvent) {
        let at = self.clock.now();
        self.sink.emit(&AppEvent::Input { event, at });

        match event {
            InputEvent::CycleMode => {
                let (from, to) = self.fsm.cycle(&mut self.plan);
                self.sink.emit(&AppEvent::ModeChanged { from, to, at });
                self.commit_plan();
            }
            InputEvent::Increment | InputEvent::Decrement => {
                let delta = if event == InputEvent::Increment { 1 } else { -1 };
                let setpoint = self.resolver.adjust(delta, minute_of_day(&at));
                info!(
                    "Manual offset {} -> setpoint {}F",
                    self.resolver.manual_offset(),
                    setpoint
                );
                self.apply_decision(self.decide());
            }
        }
    }

    // ── Per-tick operations (called by the ControlLoop) ───────

    /// Refresh the setpoint, push this tick's sample (if any), and capture
    /// the values the tick will render and report.
    pub fn on_tick(&mut self, sample_f: Option<f32>) -> TickSnapshot {
        let at = self.clock.now();
        let setpoint = self.resolver.refresh(minute_of_day(&at));
        self.smoothed = sample_f.map(|f| self.filter.push(f));
        debug!(
            "tick: mode={} temp={:?} setpoint={}",
            self.fsm.current_mode().label(),
            self.smoothed,
            setpoint
        );

        TickSnapshot {
            at,
            mode: self.fsm.current_mode(),
            smoothed: self.smoothed,
            setpoint,
        }
    }

    /// Re-resolve the setpoint and re-run the actuation policy.
    pub fn refresh_actuation(&mut self) {
        let minute = self.clock.minute_of_day();
        self.resolver.refresh(minute);
        self.apply_decision(self.decide());
    }

    /// Emit a reading for the reading log.
    pub fn record_reading(&mut self, snapshot: &TickSnapshot) {
        let record = ReadingRecord::new(
            &snapshot.at,
            snapshot.smoothed,
            snapshot.setpoint,
            snapshot.mode,
        );
        self.sink.emit(&AppEvent::Reading(record));
    }

    /// Forward an out-of-band event to the sink.
    pub fn emit(&mut self, event: &AppEvent) {
        self.sink.emit(event);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.fsm.current_mode()
    }

    pub fn setpoint(&self) -> i32 {
        self.resolver.effective()
    }

    pub fn base_setpoint(&self) -> i32 {
        self.resolver.base()
    }

    pub fn manual_offset(&self) -> i32 {
        self.resolver.manual_offset()
    }

    pub fn smoothed(&self) -> Option<f32> {
        self.smoothed
    }

    pub fn applied_decision(&self) -> ActuationDecision {
        self.applied
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ── Internal ──────────────────────────────────────────────

    fn decide(&self) -> ActuationDecision {
        self.policy
            .decide(self.fsm.current_mode(), self.smoothed, self.resolver.effective())
    }

    /// Apply what the FSM handlers asked for: quiesce first, then recompute.
    fn commit_plan(&mut self) {
        let plan = self.plan.take();
        for lamp in LampId::ALL {
            if plan.is_quiesced(lamp) {
                self.lamp_off(lamp);
                if self.applied.lamp() == Some(lamp) {
                    self.applied = ActuationDecision::OffBoth;
                }
            }
        }
        if plan.needs_recompute() {
            self.refresh_actuation();
        }
    }

    /// Drive the lamps to `decision`.  An unchanged decision is left alone
    /// so a running pulse is not restarted.
    fn apply_decision(&mut self, decision: ActuationDecision) {
        if decision == self.applied {
            return;
        }
        debug!("actuation: {:?} -> {:?}", self.applied, decision);

        match decision {
            ActuationDecision::OffBoth => self.all_off(),
            ActuationDecision::Solid(lamp) | ActuationDecision::Pulsing(lamp) => {
                // Never two lamps live at once.
                if let Some(prev) = self.applied.lamp() {
                    self.lamp_off(prev);
                }
                let result = if matches!(decision, ActuationDecision::Pulsing(_)) {
                    self.lamps[lamp as usize].pulse()
                } else {
                    self.lamps[lamp as usize].solid()
                };
                if let Err(e) = result {
                    // Both lamps are off now; leaving `applied` at OffBoth
                    // makes the next refresh retry.
                    warn!("{} lamp: {}", lamp.name(), e);
                    self.applied = ActuationDecision::OffBoth;
                    return;
                }
            }
        }
        self.applied = decision;
    }

    fn all_off(&mut self) {
        for lamp in LampId::ALL {
            self.lamp_off(lamp);
        }
    }

    fn lamp_off(&mut self, lamp: LampId) {
        if let Err(e) = self.lamps[lamp as usize].off() {
            warn!("{} lamp off: {}", lamp.name(), e);
        }
    }
}

//! Schedule controller: the wake-up state machine.
//!
//! The controller decides, from the current time and today's window, which phase the
//! light is in and arms the timers that move it to the next one:
//!
//! - **Idle**: nothing to do today (inactive day, exception day, or window over)
//! - **AwaitingStart**: one-shot timer at the start instant
//! - **Ramping**: recurring brightness tick plus one-shot turn-off timer
//! - **AwaitingTurnoff**: ramp finished, one-shot turn-off timer
//!
//! [`Controller::evaluate`] always cancels every armed timer and re-derives the phase
//! from scratch, so calling it at any moment (startup, daily refresh, config change) is
//! safe and idempotent. The controller is the only writer of its state and timers; the
//! service loop feeds it time and due events on a single thread.

pub mod timers;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fmt;

use crate::backend::LightActuator;
use crate::config::SchedulerConfig;
use crate::exception::ExceptionGate;
use crate::schedule::{RampContext, ResolvedWindow, resolve};
use timers::{TimerEvent, TimerHandle, TimerQueue};

/// Where the light is in today's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingStart,
    Ramping,
    AwaitingTurnoff,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::AwaitingStart => write!(f, "Awaiting start"),
            Phase::Ramping => write!(f, "Ramping"),
            Phase::AwaitingTurnoff => write!(f, "Awaiting turnoff"),
        }
    }
}

/// Single-light state machine owning its timers and actuator.
pub struct Controller {
    config: SchedulerConfig,
    actuator: Box<dyn LightActuator>,
    timers: TimerQueue,
    phase: Phase,
    transition_timer: Option<TimerHandle>,
    tick_timer: Option<TimerHandle>,
    ramp: Option<RampContext>,
    debug_enabled: bool,
    // Tracks if the first tick of the current ramp was logged as a new block
    first_tick_logged: bool,
}

impl Controller {
    pub fn new(config: SchedulerConfig, actuator: Box<dyn LightActuator>) -> Self {
        Self {
            config,
            actuator,
            timers: TimerQueue::new(),
            phase: Phase::Idle,
            transition_timer: None,
            tick_timer: None,
            ramp: None,
            debug_enabled: false,
            first_tick_logged: false,
        }
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn actuator_name(&self) -> &'static str {
        self.actuator.name()
    }

    /// Ramp parameters while `Ramping`.
    pub fn ramp(&self) -> Option<&RampContext> {
        self.ramp.as_ref()
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn next_deadline(&self) -> Option<DateTime<Local>> {
        self.timers.next_deadline()
    }

    /// Re-derive the phase for `now` and arm the matching timers.
    pub fn evaluate(&mut self, now: DateTime<Local>, gate: &ExceptionGate) -> Phase {
        self.cancel_all();

        if gate.is_skipped_today() {
            self.enter_idle("Skipping today: calendar exception");
            return self.phase;
        }

        let Some(window) = resolve(&self.config.week, now) else {
            self.enter_idle("Skipping today: day inactive");
            return self.phase;
        };

        if now >= window.turnoff {
            self.enter_idle("Past turnoff time, nothing to schedule today");
        } else if now < window.start {
            self.phase = Phase::AwaitingStart;
            self.transition_timer = Some(self.timers.run_at(window.start, TimerEvent::Evaluate));
            log_block_start!("Ramp starting in {}", format_remaining(window.start - now));
            if self.debug_enabled {
                log_debug!("Start timer armed for {}", window.start.format("%H:%M:%S"));
            }
        } else if now <= window.end {
            self.enter_ramp(now, &window);
        } else {
            self.phase = Phase::AwaitingTurnoff;
            self.transition_timer = Some(self.timers.run_at(window.turnoff, TimerEvent::TurnOff));
            log_block_start!(
                "Ramp complete, turning off in {}",
                format_remaining(window.turnoff - now)
            );
        }

        self.phase
    }

    /// Pop and dispatch one timer due at `now`.
    ///
    /// Returns `None` when nothing is due. Actuator failures come back as `Some(Err)`;
    /// the timers stay as the dispatch left them, so the next tick still fires.
    pub fn fire_due(
        &mut self,
        now: DateTime<Local>,
        gate: &ExceptionGate,
    ) -> Option<Result<()>> {
        let event = self.timers.pop_due(now)?;
        Some(self.handle_timer(event, now, gate))
    }

    /// Dispatch a fired timer.
    pub fn handle_timer(
        &mut self,
        event: TimerEvent,
        now: DateTime<Local>,
        gate: &ExceptionGate,
    ) -> Result<()> {
        if self.debug_enabled {
            log_debug!("Timer fired: {event} ({})", self.phase);
        }
        match event {
            TimerEvent::Evaluate => {
                // One-shot timers are consumed by pop_due
                self.transition_timer = None;
                self.evaluate(now, gate);
                Ok(())
            }
            TimerEvent::RampTick => self.ramp_tick(now),
            TimerEvent::TurnOff => {
                self.transition_timer = None;
                self.turn_off()
            }
        }
    }

    /// Cancel all timers, go idle, and switch the light off.
    pub fn turn_off(&mut self) -> Result<()> {
        self.cancel_all();
        self.phase = Phase::Idle;
        log_block_start!("Turning off {}", self.config.entity);
        self.actuator.turn_off(&self.config.entity)
    }

    fn enter_idle(&mut self, reason: &str) {
        self.phase = Phase::Idle;
        log_block_start!("{}", reason);
    }

    fn enter_ramp(&mut self, now: DateTime<Local>, window: &ResolvedWindow) {
        let ramp = RampContext::new(window.start, window.ramp_duration());
        self.phase = Phase::Ramping;
        self.ramp = Some(ramp);
        self.first_tick_logged = false;

        // First tick fires immediately
        self.tick_timer = Some(self.timers.run_every(
            now,
            self.config.adjust_frequency(),
            TimerEvent::RampTick,
        ));
        self.transition_timer = Some(self.timers.run_at(window.turnoff, TimerEvent::TurnOff));

        log_block_start!(
            "Starting brightness ramp for {} ({} → {})",
            self.config.entity,
            window.start.format("%H:%M"),
            window.end.format("%H:%M")
        );
        log_indented!("Turning off at {}", window.turnoff.format("%H:%M"));
    }

    fn ramp_tick(&mut self, now: DateTime<Local>) -> Result<()> {
        let Some(ramp) = self.ramp else {
            return Ok(());
        };

        let level = ramp.brightness_at(now, self.config.max_brightness);
        let elapsed = (now - ramp.ramp_start).num_seconds().max(0);
        let total = ramp.ramp_duration.num_seconds();
        let percent = (elapsed * 100 / total.max(1)).min(100);

        if self.first_tick_logged && !self.debug_enabled {
            log_decorated!("Ramp {percent}% complete, brightness {level}");
        } else {
            log_block_start!("Ramp {percent}% complete, brightness {level}");
            self.first_tick_logged = true;
        }
        if self.debug_enabled {
            log_indented!("Elapsed {elapsed}s of {total}s");
        }

        self.actuator.set_brightness(&self.config.entity, level)
    }

    fn cancel_all(&mut self) {
        if let Some(handle) = self.transition_timer.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.tick_timer.take() {
            self.timers.cancel(handle);
        }
        self.ramp = None;
    }
}

fn format_remaining(remaining: chrono::Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{} minutes {} seconds", secs / 60, secs % 60)
}

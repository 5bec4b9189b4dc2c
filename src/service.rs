//! Service runner: owns the controller, the exception gate and the event loop.
//!
//! The `WakeupLight` struct uses a builder pattern to support different contexts:
//! - Normal service: `WakeupLight::new(config, actuator, source).run()`
//! - Replaying a morning: `WakeupLight::new(..).with_clock(simulated).without_headers().run()`
//!
//! Everything happens on the thread calling [`WakeupLight::run`]. Other threads talk to
//! the service only through a [`ServiceHandle`].

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration as StdDuration;

use crate::backend::{LightActuator, StateSource};
use crate::config::SchedulerConfig;
use crate::constants::{DAILY_CHECK_TIME, MAXIMUM_WAIT_SECS};
use crate::core::Controller;
use crate::exception::ExceptionGate;
use crate::schedule::TimeOfDay;
use crate::time_source::{RealTimeSource, TimeSource};

/// Requests accepted by a running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Re-read the exception calendar, then re-evaluate the schedule
    Recheck,
    /// Re-evaluate the schedule with the cached exception status
    Reevaluate,
    /// Leave the event loop
    Shutdown,
}

/// Cloneable sender for [`Command`]s.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    sender: Sender<Command>,
}

impl ServiceHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| anyhow::anyhow!("Service is no longer running"))
    }

    pub fn recheck(&self) -> Result<()> {
        self.send(Command::Recheck)
    }

    pub fn reevaluate(&self) -> Result<()> {
        self.send(Command::Reevaluate)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }
}

/// Builder and runner for one wake-up light.
pub struct WakeupLight {
    controller: Controller,
    state_source: Box<dyn StateSource>,
    gate: ExceptionGate,
    clock: Arc<dyn TimeSource>,
    debug_enabled: bool,
    show_headers: bool,
    // Kept so the channel never disconnects while the service runs
    sender: Sender<Command>,
    receiver: Receiver<Command>,
}

impl WakeupLight {
    pub fn new(
        config: SchedulerConfig,
        actuator: Box<dyn LightActuator>,
        state_source: Box<dyn StateSource>,
    ) -> Self {
        let gate = ExceptionGate::new(config.calendar.as_deref());
        let (sender, receiver) = mpsc::channel();
        Self {
            controller: Controller::new(config, actuator),
            state_source,
            gate,
            clock: Arc::new(RealTimeSource),
            debug_enabled: false,
            show_headers: true,
            sender,
            receiver,
        }
    }

    /// Drive the service from `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self.controller = self.controller.debug(enabled);
        self
    }

    /// Skip the version header and end marker.
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run until shut down, or until a simulated clock reaches its end.
    pub fn run(mut self) -> Result<()> {
        let daily_check: TimeOfDay = DAILY_CHECK_TIME
            .parse()
            .context("Invalid daily check time")?;

        crate::logger::Log::set_clock(self.clock.clone());
        if self.show_headers {
            log_version!();
        }

        log_block_start!(
            "Controlling {} via {}",
            self.controller.config().entity,
            self.controller.actuator_name()
        );
        self.controller.config().log_summary();

        let now = self.clock.now();
        self.refresh_exceptions(now);
        self.controller.evaluate(now, &self.gate);

        self.event_loop(daily_check);

        log_block_start!("Wake-up light stopped");
        if self.show_headers {
            log_end!();
        }
        Ok(())
    }

    fn event_loop(&mut self, daily_check: TimeOfDay) {
        let mut next_check = next_occurrence(self.clock.now(), daily_check);

        loop {
            let now = self.clock.now();

            while let Some(result) = self.controller.fire_due(now, &self.gate) {
                if let Err(e) = result {
                    log_pipe!();
                    log_error!("Light command failed: {e:#}");
                    log_indented!("Will continue with the next scheduled update");
                }
            }

            if now >= next_check {
                log_block_start!("Daily exception check");
                self.refresh_exceptions(now);
                self.controller.evaluate(now, &self.gate);
                next_check = next_occurrence(now, daily_check);
            }

            if self.clock.is_ended() {
                break;
            }

            let wake_at = self
                .controller
                .next_deadline()
                .map_or(next_check, |deadline| deadline.min(next_check));
            let wait = (wake_at - now).to_std().unwrap_or(StdDuration::ZERO);

            if self.debug_enabled {
                log_debug!("Sleeping until {}", wake_at.format("%Y-%m-%d %H:%M:%S"));
            }

            let Some(command) = self.wait_for_command(wait) else {
                continue;
            };

            let now = self.clock.now();
            match command {
                Command::Recheck => {
                    log_block_start!("Recheck requested");
                    self.refresh_exceptions(now);
                    self.controller.evaluate(now, &self.gate);
                }
                Command::Reevaluate => {
                    self.controller.evaluate(now, &self.gate);
                }
                Command::Shutdown => break,
            }
        }
    }

    /// Block for up to `wait`, returning early if a command arrives.
    fn wait_for_command(&self, wait: StdDuration) -> Option<Command> {
        if self.clock.is_simulated() {
            // Simulated time moves only when we sleep, so commands are polled afterwards
            self.clock.sleep(wait);
            return match self.receiver.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            };
        }

        let wait = wait.min(StdDuration::from_secs(MAXIMUM_WAIT_SECS));
        match self.receiver.recv_timeout(wait) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log_pipe!();
                log_error!("Command channel disconnected unexpectedly");
                Some(Command::Shutdown)
            }
        }
    }

    fn refresh_exceptions(&mut self, now: DateTime<Local>) {
        let Some(entity) = self.gate.calendar_entity().map(str::to_owned) else {
            return;
        };

        match self.gate.refresh(now, self.state_source.as_ref()) {
            Ok(true) => log_info!("{entity} is active, skipping today"),
            Ok(false) => {
                if self.debug_enabled {
                    log_indented!("{entity} is off");
                }
            }
            Err(e) => {
                log_warning!("Exception check failed: {e:#}");
                let verdict = if self.gate.is_skipped_today() {
                    "skip"
                } else {
                    "no skip"
                };
                match self.gate.checked_on() {
                    Some(date) => log_indented!("Keeping result from {date} ({verdict})"),
                    None => log_indented!("No earlier result, assuming {verdict}"),
                }
            }
        }
    }
}

/// Next instant strictly after `now` at which the local clock reads `time`.
///
/// Days where `time` falls into a DST gap are skipped.
pub fn next_occurrence(now: DateTime<Local>, time: TimeOfDay) -> DateTime<Local> {
    let mut date = now.date_naive();
    for _ in 0..3 {
        let candidate = Local
            .from_local_datetime(&date.and_time(time.as_naive_time()))
            .earliest();
        if let Some(candidate) = candidate {
            if candidate > now {
                return candidate;
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    now + chrono::Duration::days(1)
}

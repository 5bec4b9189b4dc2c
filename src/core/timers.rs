//! Deadline-based timer table owned by the controller.
//!
//! Timers never run callbacks on their own. The service loop asks for the earliest
//! deadline, sleeps until then, and pops due events one at a time, dispatching each
//! before popping the next. A timer cancelled by an earlier dispatch is gone from the
//! table and can never fire.

use chrono::{DateTime, Duration, Local};
use std::fmt;

/// What the controller should do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// Re-derive the schedule (used to enter the ramp at start time)
    Evaluate,
    /// Apply the next ramp brightness
    RampTick,
    /// End of the window: light off
    TurnOff,
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerEvent::Evaluate => write!(f, "evaluate"),
            TimerEvent::RampTick => write!(f, "ramp tick"),
            TimerEvent::TurnOff => write!(f, "turn off"),
        }
    }
}

/// Opaque handle returned when arming a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    deadline: DateTime<Local>,
    period: Option<Duration>,
    event: TimerEvent,
}

/// Snapshot of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub event: TimerEvent,
    pub deadline: DateTime<Local>,
    pub period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer firing at `deadline`.
    pub fn run_at(&mut self, deadline: DateTime<Local>, event: TimerEvent) -> TimerHandle {
        self.arm(deadline, None, event)
    }

    /// Arm a recurring timer first firing at `first`, then every `interval`.
    ///
    /// # Panics
    /// If `interval` is not positive.
    pub fn run_every(
        &mut self,
        first: DateTime<Local>,
        interval: Duration,
        event: TimerEvent,
    ) -> TimerHandle {
        assert!(
            interval > Duration::zero(),
            "BUG: recurring timer interval must be positive"
        );
        self.arm(first, Some(interval), event)
    }

    /// Disarm a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn next_deadline(&self) -> Option<DateTime<Local>> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Pop the earliest timer due at `now`.
    ///
    /// Recurring timers are rescheduled past `now`; periods missed while the loop was
    /// busy are coalesced into this single fire.
    pub fn pop_due(&mut self, now: DateTime<Local>) -> Option<TimerEvent> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.handle))
            .map(|(i, _)| i)?;

        let event = self.timers[index].event;
        match self.timers[index].period {
            Some(period) => {
                let timer = &mut self.timers[index];
                while timer.deadline <= now {
                    timer.deadline += period;
                }
            }
            None => {
                self.timers.remove(index);
            }
        }
        Some(event)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Armed timers ordered by deadline.
    pub fn armed(&self) -> Vec<ArmedTimer> {
        let mut armed: Vec<_> = self
            .timers
            .iter()
            .map(|t| ArmedTimer {
                event: t.event,
                deadline: t.deadline,
                period: t.period,
            })
            .collect();
        armed.sort_by_key(|t| t.deadline);
        armed
    }

    fn arm(
        &mut self,
        deadline: DateTime<Local>,
        period: Option<Duration>,
        event: TimerEvent,
    ) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push(Timer {
            handle,
            deadline,
            period,
            event,
        });
        handle
    }
}

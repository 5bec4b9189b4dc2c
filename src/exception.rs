//! Daily "skip today" gate backed by a calendar entity.
//!
//! When a calendar is configured, its entity (`calendar.<name>`) is read once per day.
//! Any state other than `"off"` means an event (holiday, day off, trip) is active and
//! the wake-up ramp is suppressed for the rest of the day. Without a calendar the gate
//! never skips.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};

use crate::backend::StateSource;
use crate::constants::CALENDAR_OFF_STATE;

/// Cached per-day exception status.
#[derive(Debug, Clone)]
pub struct ExceptionGate {
    calendar_entity: Option<String>,
    skipped: bool,
    checked_on: Option<NaiveDate>,
}

impl ExceptionGate {
    /// Gate reading `calendar.<name>`, or a gate that never skips when `calendar` is `None`.
    pub fn new(calendar: Option<&str>) -> Self {
        Self {
            calendar_entity: calendar.map(|name| format!("calendar.{name}")),
            skipped: false,
            checked_on: None,
        }
    }

    pub fn calendar_entity(&self) -> Option<&str> {
        self.calendar_entity.as_deref()
    }

    /// Re-read the calendar and cache the result for `now`'s date.
    ///
    /// On a failed query the previous value is kept and the error is returned.
    pub fn refresh(&mut self, now: DateTime<Local>, source: &dyn StateSource) -> Result<bool> {
        let skipped = match &self.calendar_entity {
            Some(entity) => {
                let state = source
                    .get_state(entity)
                    .with_context(|| format!("Failed to read {entity}"))?;
                state != CALENDAR_OFF_STATE
            }
            None => false,
        };

        self.skipped = skipped;
        self.checked_on = Some(now.date_naive());
        Ok(skipped)
    }

    /// Result of the most recent successful refresh.
    pub fn is_skipped_today(&self) -> bool {
        self.skipped
    }

    /// Date of the most recent successful refresh.
    pub fn checked_on(&self) -> Option<NaiveDate> {
        self.checked_on
    }
}

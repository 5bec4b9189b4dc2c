//! Resolve today's configured window into absolute instants.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

use super::{TimeOfDay, WeekSchedule};

/// Today's wake-up window as absolute local timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub turnoff: DateTime<Local>,
}

impl ResolvedWindow {
    pub fn ramp_duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Resolve the window for `now`'s calendar day.
///
/// Returns `None` when the day is missing, inactive, or one of its times does not exist
/// locally (spring-forward gap). Ambiguous local times pick the earliest instant.
/// A window whose instants are not ordered `start < end <= turnoff` is never returned.
pub fn resolve(week: &WeekSchedule, now: DateTime<Local>) -> Option<ResolvedWindow> {
    let day = week.day(now.weekday())?;
    if !day.active() {
        return None;
    }

    let date = now.date_naive();
    let window = ResolvedWindow {
        start: at(date, day.start())?,
        end: at(date, day.end())?,
        turnoff: at(date, day.turnoff())?,
    };
    (window.start < window.end && window.end <= window.turnoff).then_some(window)
}

fn at(date: NaiveDate, time: TimeOfDay) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_time(time.as_naive_time()))
        .earliest()
}

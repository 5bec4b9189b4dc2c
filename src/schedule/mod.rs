//! Per-weekday wake-up windows and the math built on them.
//!
//! - [`TimeOfDay`] and [`DayConfig`] describe one day's window as configured.
//! - [`WeekSchedule`] maps each [`Weekday`] to an optional validated `DayConfig`.
//! - [`window`] turns today's entry into absolute instants.
//! - [`ramp`] maps elapsed ramp time to a brightness level.

pub mod ramp;
pub mod window;

pub use ramp::{RampContext, brightness};
pub use window::{ResolvedWindow, resolve};

use anyhow::{Context, Result};
use chrono::{NaiveTime, Weekday};
use std::fmt;
use std::str::FromStr;

/// Hour/minute pair within a single day (00:00 to 23:59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .with_context(|| format!("Invalid time '{s}', expected HH:MM"))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// One weekday's wake-up window.
///
/// Fields are private so an active day can only exist with `start < end <= turnoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayConfig {
    active: bool,
    start: TimeOfDay,
    end: TimeOfDay,
    turnoff: TimeOfDay,
}

impl DayConfig {
    /// Build a day entry, enforcing `start < end <= turnoff` for active days.
    pub fn new(active: bool, start: TimeOfDay, end: TimeOfDay, turnoff: TimeOfDay) -> Result<Self> {
        if active {
            if start >= end {
                anyhow::bail!("start ({start}) must be before end ({end})");
            }
            if end > turnoff {
                anyhow::bail!("end ({end}) must not be after turnoff ({turnoff})");
            }
        }
        Ok(Self {
            active,
            start,
            end,
            turnoff,
        })
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn turnoff(&self) -> TimeOfDay {
        self.turnoff
    }
}

/// Wake-up windows for the whole week, indexed by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [Option<DayConfig>; 7],
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, weekday: Weekday, day: DayConfig) {
        self.days[weekday.num_days_from_monday() as usize] = Some(day);
    }

    pub fn with_day(mut self, weekday: Weekday, day: DayConfig) -> Self {
        self.set(weekday, day);
        self
    }

    /// Today's entry, or `None` when the day was never configured.
    pub fn day(&self, weekday: Weekday) -> Option<&DayConfig> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// Configured days that will actually ramp, Monday first.
    pub fn active_days(&self) -> impl Iterator<Item = (Weekday, &DayConfig)> {
        WEEK.iter()
            .filter_map(|wd| self.day(*wd).filter(|d| d.active()).map(|d| (*wd, d)))
    }
}

/// Monday through Sunday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn tod(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_time_of_day_parsing() {
        assert_eq!(tod("06:20"), TimeOfDay::new(6, 20).unwrap());
        assert_eq!(tod(" 23:59 ").to_string(), "23:59");
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("6h20".parse::<TimeOfDay>().is_err());
        assert!("06:20:00".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_day_config_invariant() {
        assert!(DayConfig::new(true, tod("06:20"), tod("06:40"), tod("06:50")).is_ok());
        assert!(DayConfig::new(true, tod("06:20"), tod("06:40"), tod("06:40")).is_ok());
        assert!(DayConfig::new(true, tod("06:40"), tod("06:40"), tod("06:50")).is_err());
        assert!(DayConfig::new(true, tod("06:20"), tod("06:55"), tod("06:50")).is_err());
        // Inactive days are never ramped, so their times are not checked
        assert!(DayConfig::new(false, tod("07:00"), tod("06:00"), tod("05:00")).is_ok());
    }

    #[test]
    fn test_week_schedule_lookup() {
        let day = DayConfig::new(true, tod("06:20"), tod("06:40"), tod("06:50")).unwrap();
        let off = DayConfig::new(false, tod("06:20"), tod("06:40"), tod("06:50")).unwrap();
        let week = WeekSchedule::new()
            .with_day(Weekday::Wed, day)
            .with_day(Weekday::Sat, off);

        assert_eq!(week.day(Weekday::Wed), Some(&day));
        assert_eq!(week.day(Weekday::Mon), None);
        let active: Vec<_> = week.active_days().map(|(wd, _)| wd).collect();
        assert_eq!(active, vec![Weekday::Wed]);
    }
}

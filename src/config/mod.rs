//! Configuration for the wake-up light.
//!
//! Settings live in `wakeup-light.toml`:
//!
//! ```toml
//! entity = "light.bedroom"   # Light to control
//! max_brightness = 254       # Brightness reached at the end of the ramp (1-255)
//! adjust_frequency = 60      # Seconds between brightness updates while ramping (1-3600)
//! calendar = "holidays"      # Optional: skip days with an active calendar.holidays event
//!
//! [days.monday]
//! active = true
//! start = "06:20"            # Ramp begins (HH:MM)
//! end = "06:40"              # Full brightness reached
//! turnoff = "06:50"          # Light switched off
//! ```
//!
//! ## Validation
//!
//! Top-level values are validated strictly and a bad value fails the load. Day entries
//! are fail-safe instead: a malformed time, an unknown key inside a day table, or a
//! window that does not satisfy `start < end <= turnoff` is logged and the day is
//! treated as inactive. Unknown weekday names are logged and ignored. A typo can never
//! turn the light on at the wrong time.

pub mod builder;
pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use chrono::{Duration, Weekday};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::constants::*;
use crate::schedule::{DayConfig, TimeOfDay, WeekSchedule};

// Re-export public API
pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use validation::validate_config;

/// Raw configuration as read from TOML. Missing values fall back to defaults.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Entity id of the light (required)
    pub entity: Option<String>,
    pub max_brightness: Option<u32>,
    /// Seconds between ramp ticks
    #[serde(alias = "freq")]
    pub adjust_frequency: Option<u64>,
    /// Calendar name; the entity read is `calendar.<name>`
    pub calendar: Option<String>,
    /// Weekday name → day entry
    #[serde(default)]
    pub days: BTreeMap<String, DayEntry>,
}

/// One `[days.<weekday>]` table.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DayEntry {
    pub active: Option<bool>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub turnoff: Option<String>,
    /// Keys not listed above, kept so a typo demotes the day instead of being ignored
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl DayEntry {
    /// Parse into a validated [`DayConfig`].
    pub fn to_day_config(&self) -> Result<DayConfig> {
        if !self.unknown.is_empty() {
            let keys: Vec<&str> = self.unknown.keys().map(String::as_str).collect();
            anyhow::bail!(
                "unknown key(s) {} (expected active, start, end, turnoff)",
                keys.join(", ")
            );
        }
        let start: TimeOfDay = self.start.as_deref().unwrap_or(DEFAULT_START).parse()?;
        let end: TimeOfDay = self.end.as_deref().unwrap_or(DEFAULT_END).parse()?;
        let turnoff: TimeOfDay = self.turnoff.as_deref().unwrap_or(DEFAULT_TURNOFF).parse()?;
        DayConfig::new(self.active.unwrap_or(false), start, end, turnoff)
    }
}

impl Config {
    /// Build the weekly schedule, demoting defective day entries to inactive.
    pub fn week_schedule(&self) -> WeekSchedule {
        let mut week = WeekSchedule::new();
        for (name, entry) in &self.days {
            let weekday = match name.parse::<Weekday>() {
                Ok(weekday) => weekday,
                Err(_) => {
                    log_warning!("Unknown day '{name}' in configuration, ignoring it");
                    continue;
                }
            };
            match entry.to_day_config() {
                Ok(day) => week.set(weekday, day),
                Err(e) => {
                    log_warning!("Day '{name}' is invalid and will stay inactive: {e:#}");
                }
            }
        }
        week
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
            .and_then(|b| u8::try_from(b).ok())
            .unwrap_or(DEFAULT_MAX_BRIGHTNESS)
    }

    pub fn adjust_frequency(&self) -> Duration {
        let secs = self
            .adjust_frequency
            .unwrap_or(DEFAULT_ADJUST_FREQUENCY)
            .clamp(MINIMUM_ADJUST_FREQUENCY, MAXIMUM_ADJUST_FREQUENCY);
        Duration::seconds(secs as i64)
    }
}

/// Immutable runtime configuration handed to the scheduler at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub entity: String,
    pub max_brightness: u8,
    // Always within MINIMUM..=MAXIMUM_ADJUST_FREQUENCY seconds
    adjust_frequency: Duration,
    pub calendar: Option<String>,
    pub week: WeekSchedule,
}

impl SchedulerConfig {
    /// Validate `config` and resolve it into runtime form.
    pub fn from_config(config: &Config) -> Result<Self> {
        validate_config(config)?;
        let entity = config
            .entity
            .clone()
            .context("entity must be set to the light to control")?;

        Ok(Self {
            entity,
            max_brightness: config.max_brightness(),
            adjust_frequency: config.adjust_frequency(),
            calendar: config.calendar.clone(),
            week: config.week_schedule(),
        })
    }

    /// Minimal configuration with defaults, mostly useful for embedding and tests.
    pub fn new(entity: impl Into<String>, week: WeekSchedule) -> Self {
        Self {
            entity: entity.into(),
            max_brightness: DEFAULT_MAX_BRIGHTNESS,
            adjust_frequency: Duration::seconds(DEFAULT_ADJUST_FREQUENCY as i64),
            calendar: None,
            week,
        }
    }

    pub fn with_max_brightness(mut self, max_brightness: u8) -> Self {
        self.max_brightness = max_brightness;
        self
    }

    /// Set the ramp tick interval, rejecting values outside the configurable range.
    pub fn with_adjust_frequency(mut self, adjust_frequency: Duration) -> Result<Self> {
        let min = Duration::seconds(MINIMUM_ADJUST_FREQUENCY as i64);
        let max = Duration::seconds(MAXIMUM_ADJUST_FREQUENCY as i64);
        if adjust_frequency < min || adjust_frequency > max {
            anyhow::bail!(
                "adjust_frequency ({} seconds) must be between {} and {} seconds",
                adjust_frequency.num_seconds(),
                MINIMUM_ADJUST_FREQUENCY,
                MAXIMUM_ADJUST_FREQUENCY
            );
        }
        self.adjust_frequency = adjust_frequency;
        Ok(self)
    }

    pub fn adjust_frequency(&self) -> Duration {
        self.adjust_frequency
    }

    pub fn with_calendar(mut self, calendar: impl Into<String>) -> Self {
        self.calendar = Some(calendar.into());
        self
    }

    /// Log the effective settings under the current block.
    pub fn log_summary(&self) {
        log_indented!("Max brightness: {}", self.max_brightness);
        log_indented!(
            "Adjust frequency: {} seconds",
            self.adjust_frequency.num_seconds()
        );
        match &self.calendar {
            Some(name) => log_indented!("Exception calendar: calendar.{name}"),
            None => log_indented!("Exception calendar: none"),
        }
        let mut any_active = false;
        for (weekday, day) in self.week.active_days() {
            any_active = true;
            log_indented!(
                "{weekday}: {} → {}, off at {}",
                day.start(),
                day.end(),
                day.turnoff()
            );
        }
        if !any_active {
            log_indented!("No active days configured");
        }
    }
}

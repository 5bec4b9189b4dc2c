//! Configuration validation.
//!
//! Only top-level settings are checked here. Day entries are parsed leniently in
//! [`Config::week_schedule`](super::Config::week_schedule).

use anyhow::Result;

use super::Config;
use crate::constants::*;

/// Reject configurations the scheduler cannot run with.
pub fn validate_config(config: &Config) -> Result<()> {
    match config.entity.as_deref().map(str::trim) {
        None | Some("") => anyhow::bail!("entity must be set to the light to control"),
        Some(_) => {}
    }

    if let Some(brightness) = config.max_brightness {
        let range = u32::from(MINIMUM_MAX_BRIGHTNESS)..=u32::from(u8::MAX);
        if !range.contains(&brightness) {
            anyhow::bail!(
                "max_brightness ({}) must be between {} and {}",
                brightness,
                MINIMUM_MAX_BRIGHTNESS,
                u8::MAX
            );
        }
    }

    if let Some(freq) = config.adjust_frequency {
        if !(MINIMUM_ADJUST_FREQUENCY..=MAXIMUM_ADJUST_FREQUENCY).contains(&freq) {
            anyhow::bail!(
                "adjust_frequency ({} seconds) must be between {} and {} seconds",
                freq,
                MINIMUM_ADJUST_FREQUENCY,
                MAXIMUM_ADJUST_FREQUENCY
            );
        }
    }

    if let Some(calendar) = config.calendar.as_deref() {
        if calendar.trim().is_empty() {
            anyhow::bail!("calendar must not be empty (remove it to disable exception days)");
        }
        if calendar.starts_with("calendar.") {
            anyhow::bail!(
                "calendar should be the bare name, e.g. \"{}\" instead of \"{}\"",
                calendar.trim_start_matches("calendar."),
                calendar
            );
        }
    }

    Ok(())
}

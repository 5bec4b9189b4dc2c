//! Defaults and limits shared across the crate.

// # Brightness
pub const DEFAULT_MAX_BRIGHTNESS: u8 = 254;
pub const MINIMUM_MAX_BRIGHTNESS: u8 = 1;

// # Ramp timing
pub const DEFAULT_ADJUST_FREQUENCY: u64 = 60; // seconds between ramp ticks
pub const MINIMUM_ADJUST_FREQUENCY: u64 = 1;
pub const MAXIMUM_ADJUST_FREQUENCY: u64 = 3600;

// # Day window defaults ("HH:MM")
pub const DEFAULT_START: &str = "06:20";
pub const DEFAULT_END: &str = "06:40";
pub const DEFAULT_TURNOFF: &str = "06:50";

/// Local time at which the exception gate is refreshed every day.
pub const DAILY_CHECK_TIME: &str = "03:30";

/// Longest single wait on the real clock, so suspend and clock changes are noticed.
pub const MAXIMUM_WAIT_SECS: u64 = 60;

/// Entity state meaning "no calendar event today".
pub const CALENDAR_OFF_STATE: &str = "off";

pub const CONFIG_DIR_NAME: &str = "wakeup-light";
pub const CONFIG_FILE_NAME: &str = "wakeup-light.toml";

#[cfg(test)]
pub mod test_constants {
    pub const TEST_ENTITY: &str = "light.bedroom";
    pub const TEST_START: &str = "06:20";
    pub const TEST_END: &str = "06:40";
    pub const TEST_TURNOFF: &str = "06:50";
}

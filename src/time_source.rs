//! Clock abstraction for real and simulated time.
//!
//! The service never calls `Local::now()` or `thread::sleep` directly; it goes through a
//! [`TimeSource`] so a whole morning can be replayed in milliseconds under test.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Wall-clock implementation
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Fast-forward clock: every `sleep` jumps time forward by exactly the requested
/// duration, capped at the end of the simulation.
pub struct SimulatedTimeSource {
    end_time: DateTime<Local>,
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            end_time,
            current: Mutex::new(start_time),
        }
    }

    /// Jump directly to `time` (never backwards, never past the end).
    pub fn advance_to(&self, time: DateTime<Local>) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if time > *guard {
            *guard = time.min(self.end_time);
        }
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX);
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = guard
            .checked_add_signed(step)
            .map_or(self.end_time, |t| t.min(self.end_time));
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.now() >= self.end_time
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?
        .and_local_timezone(Local)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_sleep_advances_and_caps() {
        let start = parse_datetime("2024-03-13 06:00:00").unwrap();
        let end = parse_datetime("2024-03-13 07:00:00").unwrap();
        let clock = SimulatedTimeSource::new(start, end);

        clock.sleep(StdDuration::from_secs(600));
        assert_eq!(clock.now(), parse_datetime("2024-03-13 06:10:00").unwrap());
        assert!(!clock.is_ended());

        clock.sleep(StdDuration::from_secs(86_400));
        assert_eq!(clock.now(), end);
        assert!(clock.is_ended());
    }

    #[test]
    fn test_advance_to_never_goes_backwards() {
        let start = parse_datetime("2024-03-13 06:00:00").unwrap();
        let end = parse_datetime("2024-03-13 07:00:00").unwrap();
        let clock = SimulatedTimeSource::new(start, end);

        clock.advance_to(parse_datetime("2024-03-13 06:30:00").unwrap());
        clock.advance_to(parse_datetime("2024-03-13 06:05:00").unwrap());
        assert_eq!(clock.now(), parse_datetime("2024-03-13 06:30:00").unwrap());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("06:00").is_err());
    }
}

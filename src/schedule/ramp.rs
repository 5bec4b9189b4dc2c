//! Brightness ramp calculation.
//!
//! The ramp is linear and rounds up, so the first tick after the start instant is
//! already visible and the level reaches `max` exactly at the end of the window.

use chrono::{DateTime, Duration, Local};

/// Ramp parameters captured once when ramping begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampContext {
    pub ramp_start: DateTime<Local>,
    pub ramp_duration: Duration,
}

impl RampContext {
    pub fn new(ramp_start: DateTime<Local>, ramp_duration: Duration) -> Self {
        Self {
            ramp_start,
            ramp_duration,
        }
    }

    /// Brightness for `now` within this ramp.
    pub fn brightness_at(&self, now: DateTime<Local>, max_brightness: u8) -> u8 {
        brightness(now - self.ramp_start, self.ramp_duration, max_brightness)
    }
}

/// Map elapsed ramp time to a brightness level in `0..=max_brightness`.
///
/// # Panics
/// If `ramp_duration` is not positive. Windows are validated at load time so this
/// can only be reached through a bug.
pub fn brightness(elapsed: Duration, ramp_duration: Duration, max_brightness: u8) -> u8 {
    assert!(
        ramp_duration > Duration::zero(),
        "BUG: ramp duration must be positive (got {ramp_duration})"
    );

    if elapsed <= Duration::zero() {
        return 0;
    }
    if elapsed >= ramp_duration {
        return max_brightness;
    }

    let elapsed_ms = i128::from(elapsed.num_milliseconds());
    let duration_ms = i128::from(ramp_duration.num_milliseconds());
    let scaled = i128::from(max_brightness) * elapsed_ms;
    // Ceiling division; both operands are positive here
    let level = (scaled + duration_ms - 1) / duration_ms;

    level.clamp(0, i128::from(max_brightness)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_brightness_midpoint() {
        let level = brightness(Duration::seconds(600), Duration::seconds(1200), 254);
        assert_eq!(level, 127);
    }

    #[test]
    fn test_brightness_rounds_up() {
        // 254 * 1/1200 = 0.21 → 1
        assert_eq!(brightness(Duration::seconds(1), Duration::seconds(1200), 254), 1);
        // 254 * 61/1200 = 12.91 → 13
        assert_eq!(brightness(Duration::seconds(61), Duration::seconds(1200), 254), 13);
    }

    #[test]
    fn test_brightness_bounds() {
        let ramp = Duration::seconds(1200);
        assert_eq!(brightness(Duration::zero(), ramp, 254), 0);
        assert_eq!(brightness(Duration::seconds(-30), ramp, 254), 0);
        assert_eq!(brightness(ramp, ramp, 254), 254);
        assert_eq!(brightness(Duration::hours(3), ramp, 254), 254);
    }

    #[test]
    #[should_panic(expected = "ramp duration must be positive")]
    fn test_brightness_rejects_empty_ramp() {
        brightness(Duration::seconds(1), Duration::zero(), 254);
    }

    #[test]
    fn test_ramp_context_brightness_at() {
        use chrono::TimeZone;
        let start = Local.with_ymd_and_hms(2024, 3, 13, 6, 20, 0).unwrap();
        let ctx = RampContext::new(start, Duration::minutes(20));
        assert_eq!(ctx.brightness_at(start, 254), 0);
        assert_eq!(ctx.brightness_at(start + Duration::minutes(10), 254), 127);
        assert_eq!(ctx.brightness_at(start + Duration::minutes(25), 254), 254);
    }

    proptest! {
        #[test]
        fn prop_never_positive_before_start(
            elapsed in -86_400i64..=0,
            duration in 1i64..86_400,
            max in 1u8..=255,
        ) {
            prop_assert_eq!(
                brightness(Duration::seconds(elapsed), Duration::seconds(duration), max),
                0
            );
        }

        #[test]
        fn prop_saturates_after_end(
            duration in 1i64..86_400,
            extra in 0i64..86_400,
            max in 1u8..=255,
        ) {
            let elapsed = Duration::seconds(duration + extra);
            prop_assert_eq!(brightness(elapsed, Duration::seconds(duration), max), max);
        }

        #[test]
        fn prop_monotone_within_ramp(
            duration in 2i64..86_400,
            a in 1i64..86_400,
            b in 1i64..86_400,
            max in 1u8..=255,
        ) {
            // Fold both samples into 1..duration
            let a = 1 + a % (duration - 1);
            let b = 1 + b % (duration - 1);
            let (e1, e2) = if a <= b { (a, b) } else { (b, a) };
            let ramp = Duration::seconds(duration);
            let l1 = brightness(Duration::seconds(e1), ramp, max);
            let l2 = brightness(Duration::seconds(e2), ramp, max);
            prop_assert!(l1 <= l2);
            prop_assert!(l2 <= max);
        }
    }
}

//! Wall-clock timestamps for output lines.
//!
//! Every line `war` prints is prefixed with the local time of day as
//! `HH:MM:SS.ffff`: shorter than a full date, with enough precision to see
//! the debounce window at work.
//!
//! # Examples
//!
//! ```
//! use war_core::WallClock;
//!
//! let stamp = WallClock::now().to_string();
//! assert_eq!(stamp.len(), WallClock::WIDTH);
//! ```

use std::fmt;

use chrono::{DateTime, Local, NaiveTime, Timelike};

/// A local time of day rendered as a fixed-width `HH:MM:SS.ffff` stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallClock(NaiveTime);

impl WallClock {
    /// Width in characters of a rendered stamp.
    pub const WIDTH: usize = 13;

    /// Captures the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Local::now())
    }

    /// Wraps an explicit time of day.
    #[inline]
    #[must_use]
    pub const fn from_time(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Ten-thousandths of a second, clamped so a leap second still renders
    /// in four digits.
    fn fraction(self) -> u32 {
        (self.0.nanosecond() / 100_000).min(9_999)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for WallClock {
    fn from(at: DateTime<Tz>) -> Self {
        Self(at.time())
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:04}",
            self.0.hour(),
            self.0.minute(),
            self.0.second(),
            self.fraction()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn at(h: u32, m: u32, s: u32, nanos: u32) -> WallClock {
        WallClock::from_time(NaiveTime::from_hms_nano_opt(h, m, s, nanos).unwrap())
    }

    #[test]
    fn test_display_pads_every_field() {
        assert_snapshot!(at(9, 5, 3, 7_000_000).to_string(), @"09:05:03.0070");
    }

    #[test]
    fn test_display_truncates_fraction() {
        assert_snapshot!(at(23, 59, 59, 999_999_999).to_string(), @"23:59:59.9999");
    }

    #[test]
    fn test_leap_second_stays_fixed_width() {
        let stamp = at(23, 59, 59, 1_500_000_000).to_string();
        assert_eq!(stamp, "23:59:59.9999");
    }

    #[test]
    fn test_now_is_fixed_width() {
        assert_eq!(WallClock::now().to_string().len(), WallClock::WIDTH);
    }
}

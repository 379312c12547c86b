//! Countdown arithmetic and display times.
//!
//! Upstream sources disagree on how they express departure times: TfL sends
//! a relative countdown, GTFS-realtime sends epoch seconds, and Darwin sends
//! local "HH:MM" clock strings alongside the board generation timestamp.
//! This module turns all of them into "seconds until departure".

use std::fmt;

use chrono::{DateTime, Timelike, Utc};

/// Seconds in a day, used to wrap clock differences past midnight.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Countdowns below this are shown as "Due".
const DUE_THRESHOLD_SECS: i64 = 60;

/// Error returned when parsing an invalid clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Source of the current time.
///
/// Adapters take a clock rather than calling `Utc::now()` so that
/// countdowns can be tested against fixed instants.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A time of day with minute precision, as printed on rail boards.
///
/// # Examples
///
/// ```
/// use arrivals::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(t.seconds_of_day(), 52_200);
/// assert!(ClockTime::parse_hhmm("On time").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Create a clock time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self { hour, minute })
    }

    /// Parse "HH:MM".
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::new(hour, minute)
    }

    /// Truncate a seconds-of-day value to its minute.
    pub fn from_seconds_of_day(seconds: u32) -> Self {
        let seconds = seconds % SECONDS_PER_DAY as u32;
        Self {
            hour: seconds / 3600,
            minute: (seconds % 3600) / 60,
        }
    }

    /// The UTC time of day of an instant, truncated to the minute.
    pub fn of_instant(instant: DateTime<Utc>) -> Self {
        Self::from_seconds_of_day(instant.num_seconds_from_midnight())
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn seconds_of_day(&self) -> i64 {
        i64::from(self.hour * 3600 + self.minute * 60)
    }

    /// Seconds from `reference` forward to `self`.
    ///
    /// A departure earlier in the day than the reference is taken to be
    /// tomorrow's, so the result is always in `0..SECONDS_PER_DAY`.
    pub fn seconds_after(&self, reference: ClockTime) -> i64 {
        (self.seconds_of_day() - reference.seconds_of_day()).rem_euclid(SECONDS_PER_DAY)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Seconds from `now` until an absolute epoch time.
pub fn seconds_until(epoch_secs: i64, now: DateTime<Utc>) -> i64 {
    epoch_secs - now.timestamp()
}

/// Format a countdown for display.
///
/// Anything under a minute is "Due"; otherwise whole minutes, rounding
/// half up.
///
/// # Examples
///
/// ```
/// use arrivals::domain::format_time;
///
/// assert_eq!(format_time(10), "Due");
/// assert_eq!(format_time(456), "8 min");
/// ```
pub fn format_time(seconds: i64) -> String {
    if seconds < DUE_THRESHOLD_SECS {
        return "Due".to_string();
    }
    let minutes = (seconds as f64 / 60.0).round() as i64;
    format!("{minutes} min")
}

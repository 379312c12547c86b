//! The uniform arrival model shared by every source.

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;

use super::time::format_time;

/// Maximum number of arrivals shown on a board.
pub const MAX_ARRIVALS: usize = 3;

/// Countdown used when an upstream entry carries no usable time.
///
/// Sorts after every real countdown.
pub const UNKNOWN_COUNTDOWN: i64 = i64::MAX;

/// One upcoming departure, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrival {
    /// Display key derived from a hash of upstream fields.
    ///
    /// This is stable enough to key a list row between refreshes, but it is
    /// not a primary key: distinct departures may collide, and upstream ids
    /// are not trusted (DLR reports the same id for every train).
    pub id: u64,
    /// Where the service terminates.
    pub destination: String,
    /// "Due" or "N min".
    pub time: String,
    /// Seconds until departure, or [`UNKNOWN_COUNTDOWN`].
    pub seconds_to_stop: i64,
}

impl Arrival {
    /// Build an arrival, deriving the display string from the countdown.
    pub fn new(id: u64, destination: impl Into<String>, seconds_to_stop: i64) -> Self {
        Self {
            id,
            destination: destination.into(),
            time: format_time(seconds_to_stop),
            seconds_to_stop,
        }
    }
}

/// A board of arrivals for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalsInfo {
    /// Station label, including any platform or direction suffix.
    pub station: String,
    /// At most [`MAX_ARRIVALS`] arrivals, nearest first.
    pub arrivals: Vec<Arrival>,
}

/// A stop returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    /// Whether this is an interchange grouping several stops.
    pub is_hub: bool,
}

/// A stop together with its child stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopDetails {
    pub id: String,
    pub name: String,
    pub children: Vec<StopResult>,
}

/// Hash any value into a display key.
pub fn display_key<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Sort nearest-first and keep the first [`MAX_ARRIVALS`].
pub fn nearest(mut arrivals: Vec<Arrival>) -> Vec<Arrival> {
    arrivals.sort_by_key(|a| a.seconds_to_stop);
    arrivals.truncate(MAX_ARRIVALS);
    arrivals
}

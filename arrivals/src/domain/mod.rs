//! Domain types shared by every arrivals source.
//!
//! The uniform arrival model, the single caller-facing error, and the
//! time and text helpers the source adapters use to build it.

mod arrival;
mod display;
mod error;
mod station;
mod time;

pub use arrival::{
    Arrival, ArrivalsInfo, MAX_ARRIVALS, StopDetails, StopResult, UNKNOWN_COUNTDOWN, display_key,
    nearest,
};
pub use display::{filter_led_chars, platform_matches, sanitize_platform};
pub use error::NoDataError;
pub use station::{Crs, InvalidCrs};
pub use time::{
    Clock, ClockTime, FixedClock, SECONDS_PER_DAY, SystemClock, TimeError, format_time,
    seconds_until,
};

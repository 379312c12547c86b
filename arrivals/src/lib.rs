//! Live departure boards.
//!
//! Three sources (TfL, GTFS-realtime and National Rail Darwin) are each
//! normalised into the same small board: a station label and at most three
//! arrivals, nearest first, with a countdown and a display time.

pub mod darwin;
pub mod domain;
pub mod gtfs;
pub mod http;
pub mod settings;
pub mod switcher;
pub mod tfl;

#[cfg(test)]
mod test_support;

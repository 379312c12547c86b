//! National Rail departures via Darwin.
//!
//! Key characteristics of Darwin boards:
//! - Times are "HH:MM" strings in UK local time, never epoch seconds
//! - `etd` is either a revised time or a status such as "On time" or
//!   "Delayed"
//! - Service IDs are ephemeral, so they only key display rows

mod arrivals;
mod client;
mod error;
mod types;

pub use arrivals::{DarwinArrivals, MAX_COUNTDOWN_SECS, format_board};
pub use client::{DEFAULT_NUM_ROWS, DarwinClient, DarwinConfig};
pub use error::DarwinError;
pub use types::{DepartureBoard, ServiceLocation, StationSearchResult, TrainService};

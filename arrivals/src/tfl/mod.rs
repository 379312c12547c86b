//! Transport for London arrivals via the Unified API.
//!
//! Covers Underground, Overground, DLR, Elizabeth line and trams. TfL
//! sends a ready-made countdown (`timeToStation`) with each prediction, so
//! no clock arithmetic is needed here.

mod arrivals;
mod client;
mod error;
mod types;

pub use arrivals::{TflArrivals, format_arrivals};
pub use client::{TflClient, TflConfig};
pub use error::TflError;
pub use types::{ApiArrival, ApiMatchedStop, ApiSearchResult, ApiStopPoint};

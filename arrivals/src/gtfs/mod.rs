//! GTFS-realtime arrivals.
//!
//! Predictions come from a protobuf trip updates feed and carry absolute
//! epoch times. Stop names are not in the realtime feed, so they are read
//! from the static schedule's stops.txt and cached per schedule URL.

mod arrivals;
mod client;
mod error;
mod stops;

pub use arrivals::{
    GtfsArrivals, StopPrediction, TripPrediction, format_arrivals, trip_predictions,
};
pub use client::{GtfsClient, GtfsConfig};
pub use error::GtfsError;
pub use stops::{
    GtfsStop, STOPS_FILE, StopCache, StopCacheConfig, StopDirectory, read_unpacked, unpack_schedule,
};

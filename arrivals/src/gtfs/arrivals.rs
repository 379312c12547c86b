//! Arrivals from a GTFS-realtime trip updates feed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gtfs_realtime::FeedMessage;
use tracing::{debug, warn};

use crate::domain::{
    Arrival, ArrivalsInfo, Clock, NoDataError, StopResult, UNKNOWN_COUNTDOWN, display_key,
    nearest, seconds_until,
};
use crate::settings::SettingsStore;

use super::client::GtfsClient;
use super::error::GtfsError;
use super::stops::{StopCache, StopDirectory};

/// A trip's predicted calls, in stop order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPrediction {
    pub trip_id: String,
    pub route_id: String,
    pub stops: Vec<StopPrediction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopPrediction {
    pub stop_id: String,
    /// Predicted arrival, epoch seconds.
    pub arrival_time: Option<i64>,
}

/// Pull trip updates with at least one stop-time update out of a feed.
pub fn trip_predictions(feed: &FeedMessage) -> Vec<TripPrediction> {
    feed.entity
        .iter()
        .filter_map(|entity| entity.trip_update.as_ref())
        .filter(|update| !update.stop_time_update.is_empty())
        .map(|update| TripPrediction {
            trip_id: update.trip.trip_id.clone().unwrap_or_default(),
            route_id: update.trip.route_id.clone().unwrap_or_default(),
            stops: update
                .stop_time_update
                .iter()
                .map(|stu| StopPrediction {
                    stop_id: stu.stop_id.clone().unwrap_or_default(),
                    arrival_time: stu.arrival.as_ref().and_then(|event| event.time),
                })
                .collect(),
        })
        .collect()
}

/// The next three calls at `stop_id` across all trips.
///
/// Destinations read "{route} - {final stop name}". Names come from
/// `names` when available, otherwise the raw stop id is shown.
pub fn format_arrivals(
    trips: &[TripPrediction],
    stop_id: &str,
    names: Option<&StopDirectory>,
    now: DateTime<Utc>,
) -> ArrivalsInfo {
    let name = |id: &str| names.map_or(id, |d| d.name(id)).to_string();

    let mut arrivals = Vec::new();
    for trip in trips {
        let Some(last) = trip.stops.last() else {
            continue;
        };
        let destination = format!("{} - {}", trip.route_id, name(&last.stop_id));

        for call in trip.stops.iter().filter(|s| s.stop_id == stop_id) {
            let seconds = call
                .arrival_time
                .map_or(UNKNOWN_COUNTDOWN, |time| seconds_until(time, now));
            let id = display_key(&(&trip.trip_id, &call.stop_id, call.arrival_time));
            arrivals.push(Arrival::new(id, destination.clone(), seconds));
        }
    }

    ArrivalsInfo {
        station: name(stop_id),
        arrivals: nearest(arrivals),
    }
}

/// GTFS-realtime arrivals source.
#[derive(Clone)]
pub struct GtfsArrivals {
    client: GtfsClient,
    stops: StopCache,
    settings: SettingsStore,
    clock: Arc<dyn Clock>,
}

impl GtfsArrivals {
    pub fn new(
        client: GtfsClient,
        stops: StopCache,
        settings: SettingsStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            stops,
            settings,
            clock,
        }
    }

    /// The next arrivals at the configured stop.
    pub async fn latest(&self) -> Result<ArrivalsInfo, NoDataError> {
        let settings = self.settings.snapshot().await.gtfs;

        let feed = self
            .client
            .fetch_feed(&settings.realtime_url)
            .await
            .map_err(|e| {
                warn!(url = %settings.realtime_url, error = %e, "GTFS feed failed");
                NoDataError::from(e)
            })?;
        let trips = trip_predictions(&feed);

        let names = match self.directory(&settings.schedule_url).await {
            Ok(directory) => Some(directory),
            Err(e) => {
                warn!(
                    url = %settings.schedule_url,
                    error = %e,
                    "Stop names unavailable, showing ids"
                );
                None
            }
        };

        let info = format_arrivals(&trips, &settings.stop_id, names.as_deref(), self.clock.now());
        debug!(
            stop_id = %settings.stop_id,
            trips = trips.len(),
            arrivals = info.arrivals.len(),
            "GTFS arrivals formatted"
        );

        if info.arrivals.is_empty() {
            return Err(NoDataError::new("No arrivals found"));
        }
        Ok(info)
    }

    /// Every stop in a static schedule.
    ///
    /// An explicit lookup, so a remembered failure is retried.
    pub async fn stops(&self, schedule_url: &str) -> Result<Vec<StopResult>, NoDataError> {
        self.stops.forget_failure(schedule_url).await;
        let directory = self
            .directory(schedule_url)
            .await
            .map_err(|e| NoDataError::new(e.to_string()))?;
        Ok(directory.stops())
    }

    /// The stop directory for a schedule.
    ///
    /// Memory first, then stops.txt unpacked by an earlier run, and only
    /// then a download.
    async fn directory(&self, schedule_url: &str) -> Result<Arc<StopDirectory>, Arc<GtfsError>> {
        let dir = self
            .client
            .data_dir()
            .join(format!("{:016x}", display_key(schedule_url)));
        let max_age = self.stops.ttl();

        self.stops
            .get_or_load(schedule_url, async {
                if let Some(directory) = self.client.unpacked_stops(&dir, max_age).await? {
                    debug!(url = schedule_url, stops = directory.len(), "GTFS stops read from disk");
                    return Ok(Arc::new(directory));
                }
                let directory = self.client.download_stops(schedule_url, &dir).await?;
                Ok::<_, GtfsError>(Arc::new(directory))
            })
            .await
    }
}

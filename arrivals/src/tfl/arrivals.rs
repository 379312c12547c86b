//! London arrivals from the TfL Unified API.

use tracing::{debug, warn};

use crate::domain::{
    Arrival, ArrivalsInfo, MAX_ARRIVALS, NoDataError, StopDetails, StopResult, display_key,
    platform_matches, sanitize_platform,
};
use crate::settings::{Direction, SettingsStore, TflSettings};

use super::client::TflClient;
use super::types::{ApiArrival, ApiStopPoint};

/// Suffixes TfL appends to station and destination names.
const NAME_SUFFIXES: [&str; 3] = ["Rail Station", "Underground Station", "DLR Station"];

/// Child stop types that represent a line-level station.
const STATION_STOP_TYPES: [&str; 2] = ["NaptanMetroStation", "NaptanRailStation"];

const HUB_PREFIX: &str = "HUB";

/// TfL arrivals source.
#[derive(Clone)]
pub struct TflArrivals {
    client: TflClient,
    settings: SettingsStore,
}

impl TflArrivals {
    pub fn new(client: TflClient, settings: SettingsStore) -> Self {
        Self { client, settings }
    }

    /// The next arrivals at the configured stop.
    pub async fn latest(&self) -> Result<ArrivalsInfo, NoDataError> {
        let settings = self.settings.snapshot().await.tfl;

        let raw = self
            .client
            .fetch_arrivals(&settings.stop_id)
            .await
            .map_err(|e| {
                warn!(stop_id = %settings.stop_id, error = %e, "TfL fetch failed");
                NoDataError::from(e)
            })?;

        let info = format_arrivals(&raw, &settings);
        debug!(
            stop_id = %settings.stop_id,
            upstream = raw.len(),
            arrivals = info.arrivals.len(),
            "TfL arrivals formatted"
        );

        if info.arrivals.is_empty() {
            return Err(NoDataError::new("No arrivals found"));
        }
        Ok(info)
    }

    /// Rail and metro stops matching `query`.
    pub async fn search_stops(&self, query: &str) -> Result<Vec<StopResult>, NoDataError> {
        let result = self.client.search_stations(query).await?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| StopResult {
                is_hub: m.id.starts_with(HUB_PREFIX),
                id: m.id,
                name: m.name,
            })
            .collect())
    }

    /// A stop and the line-level stations beneath it.
    pub async fn stop_details(&self, id: &str) -> Result<StopDetails, NoDataError> {
        let stop = self.client.stop_details(id).await?;
        Ok(to_stop_details(stop))
    }
}

/// Sort, filter and trim raw predictions into a board.
pub fn format_arrivals(raw: &[ApiArrival], settings: &TflSettings) -> ArrivalsInfo {
    let station = raw
        .first()
        .map(|a| station_label(&a.station_name, settings))
        .unwrap_or_default();

    let mut sorted: Vec<&ApiArrival> = raw.iter().collect();
    sorted.sort_by_key(|a| a.time_to_station);

    let arrivals = sorted
        .into_iter()
        .filter(|a| platform_matches(&a.platform_name, &settings.platform))
        .filter(|a| match settings.direction {
            Direction::All => true,
            direction => a.direction.contains(direction.as_str()),
        })
        .take(MAX_ARRIVALS)
        .map(|a| {
            Arrival::new(
                display_key(a),
                strip_suffixes(&a.destination_name),
                a.time_to_station,
            )
        })
        .collect();

    ArrivalsInfo { station, arrivals }
}

fn station_label(name: &str, settings: &TflSettings) -> String {
    let station = strip_suffixes(name);
    let platform = sanitize_platform(&settings.platform);

    if station.is_empty() {
        station
    } else if !platform.is_empty() {
        format!("{station}: Platform {platform}")
    } else if settings.direction != Direction::All {
        format!("{station}: {}", settings.direction.label())
    } else {
        station
    }
}

fn strip_suffixes(name: &str) -> String {
    NAME_SUFFIXES
        .iter()
        .fold(name.to_string(), |name, suffix| name.replace(suffix, ""))
        .trim()
        .to_string()
}

fn to_stop_details(stop: ApiStopPoint) -> StopDetails {
    let children = stop
        .children
        .into_iter()
        .filter(|c| STATION_STOP_TYPES.contains(&c.stop_type.as_str()))
        .map(|c| StopResult {
            is_hub: c.naptan_id.starts_with(HUB_PREFIX),
            id: c.naptan_id,
            name: c.common_name,
        })
        .collect();

    StopDetails {
        id: stop.naptan_id,
        name: stop.common_name,
        children,
    }
}

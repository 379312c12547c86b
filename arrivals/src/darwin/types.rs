//! Darwin board DTOs, as served by the Huxley2 JSON proxy.
//!
//! Only the fields the board reads are kept; serde skips the rest. These use
//! `Option` liberally because Darwin omits fields rather than sending null
//! values in many cases.

use serde::Deserialize;

/// Response from `/departures/{crs}/{rows}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureBoard {
    /// When this response was generated (ISO 8601, UK local time with offset).
    /// Empty when absent; the clock is used instead.
    #[serde(default)]
    pub generated_at: String,

    /// Human-readable name of the station.
    pub location_name: String,

    /// Train services at this station. Absent when nothing is scheduled.
    pub train_services: Option<Vec<TrainService>>,
}

/// A service on the departure board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainService {
    /// Darwin service ID in URL-safe form. Ephemeral.
    pub service_id_url_safe: String,

    /// Scheduled time of departure, "HH:MM".
    pub std: Option<String>,

    /// Estimated time of departure.
    /// May be "On time", "Delayed", "Cancelled", or a time like "10:15".
    #[serde(default)]
    pub etd: String,

    /// Platform number/letter.
    pub platform: Option<String>,

    #[serde(default)]
    pub is_cancelled: bool,

    /// Destination station(s). Split services list more than one.
    #[serde(default)]
    pub destination: Vec<ServiceLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLocation {
    pub location_name: String,
}

/// One match from `/crs/{query}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSearchResult {
    pub crs_code: String,
    pub station_name: String,
}

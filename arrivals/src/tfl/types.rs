//! TfL Unified API DTOs.
//!
//! Only the fields the board needs are declared; serde skips the rest.

use serde::Deserialize;

/// One prediction from `/StopPoint/{id}/Arrivals`.
///
/// Hashed whole to key display rows, because DLR reports the same `id` for
/// every train.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiArrival {
    /// Prediction id, sent as a string.
    pub id: String,
    pub station_name: String,
    /// e.g. "Platform 2" or "Westbound - Platform 1".
    pub platform_name: String,
    /// "inbound" or "outbound"; empty on some lines.
    pub direction: String,
    pub destination_name: String,
    /// Countdown in seconds.
    pub time_to_station: i64,
}

/// Response from `/StopPoint/Search`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResult {
    #[serde(default)]
    pub matches: Vec<ApiMatchedStop>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMatchedStop {
    pub id: String,
    pub name: String,
}

/// Response from `/StopPoint/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStopPoint {
    pub common_name: String,
    pub naptan_id: String,
    /// e.g. "NaptanMetroStation", "TransportInterchange".
    pub stop_type: String,
    #[serde(default)]
    pub children: Vec<ApiStopPoint>,
}

//! National Rail departures for the configured station.
//!
//! Darwin boards carry no epoch timestamps, only local "HH:MM" clock
//! strings plus the time the board was generated. Countdowns are therefore
//! measured from `generatedAt`, not from the local clock, and wrap past
//! midnight.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::{
    Arrival, ArrivalsInfo, Clock, ClockTime, Crs, NoDataError, StopResult, display_key, nearest,
    platform_matches, sanitize_platform,
};
use crate::settings::{DarwinSettings, SettingsStore};

use super::client::{DEFAULT_NUM_ROWS, DarwinClient};
use super::error::DarwinError;
use super::types::{DepartureBoard, TrainService};

/// Departures further away than this are not shown.
pub const MAX_COUNTDOWN_SECS: i64 = 2 * 60 * 60;

const ON_TIME: &str = "On time";
const STATION_SUFFIX: &str = " Rail Station";
const UNKNOWN_DESTINATION: &str = "Unknown";

static GENERATED_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})").expect("valid regex")
});

/// Darwin arrivals source.
#[derive(Clone)]
pub struct DarwinArrivals {
    client: DarwinClient,
    settings: SettingsStore,
    clock: Arc<dyn Clock>,
}

impl DarwinArrivals {
    pub fn new(client: DarwinClient, settings: SettingsStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            settings,
            clock,
        }
    }

    /// The next departures from the configured station.
    pub async fn latest(&self) -> Result<ArrivalsInfo, NoDataError> {
        let settings = self.settings.snapshot().await.darwin;

        let board = self.fetch(&settings).await.map_err(|e| {
            warn!(crs = %settings.crs, error = %e, "Darwin fetch failed");
            NoDataError::from(e)
        })?;

        let info = format_board(&board, &settings.platform, self.clock.now());
        debug!(
            station = %info.station,
            arrivals = info.arrivals.len(),
            "Darwin board formatted"
        );

        if info.arrivals.is_empty() {
            return Err(NoDataError::new("No departures found"));
        }
        Ok(info)
    }

    /// Stations whose name or code matches `query`.
    pub async fn search_stops(&self, query: &str) -> Result<Vec<StopResult>, NoDataError> {
        let results = self.client.search_crs(query).await?;

        Ok(results
            .into_iter()
            .map(|r| StopResult {
                name: format!("{} ({})", r.station_name, r.crs_code),
                id: r.crs_code,
                is_hub: false,
            })
            .collect())
    }

    async fn fetch(&self, settings: &DarwinSettings) -> Result<DepartureBoard, DarwinError> {
        let crs = Crs::from_user_input(&settings.crs)?;
        self.client.get_departures(&crs, DEFAULT_NUM_ROWS).await
    }
}

/// Turn a board into at most three countdowns, nearest first.
///
/// `now` is only used when the board's own timestamp cannot be read.
pub fn format_board(board: &DepartureBoard, platform: &str, now: DateTime<Utc>) -> ArrivalsInfo {
    let reference = parse_generated_at(&board.generated_at).unwrap_or_else(|| {
        warn!(generated_at = %board.generated_at, "Unreadable board time, using clock");
        ClockTime::of_instant(now)
    });

    let arrivals = board
        .train_services
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|s| !s.is_cancelled)
        .filter(|s| platform_matches(s.platform.as_deref().unwrap_or_default(), platform))
        .filter_map(|s| {
            let seconds = departure_time(s)?.seconds_after(reference);
            (seconds <= MAX_COUNTDOWN_SECS).then(|| to_arrival(s, seconds))
        })
        .collect();

    ArrivalsInfo {
        station: station_label(&board.location_name, platform),
        arrivals: nearest(arrivals),
    }
}

/// The time of day the board was generated, to the minute.
fn parse_generated_at(timestamp: &str) -> Option<ClockTime> {
    let caps = GENERATED_AT.captures(timestamp)?;
    let hour = caps[4].parse().ok()?;
    let minute = caps[5].parse().ok()?;
    ClockTime::new(hour, minute).ok()
}

/// When the service will actually leave, if that can be known.
///
/// "On time" means the scheduled time; a clock time means a revised
/// estimate. Statuses such as "Delayed" or "Cancelled" carry no time and
/// the service is dropped.
fn departure_time(service: &TrainService) -> Option<ClockTime> {
    let time = if service.etd == ON_TIME {
        service.std.as_deref()?
    } else if service.etd.contains(':') {
        service.etd.as_str()
    } else {
        return None;
    };
    ClockTime::parse_hhmm(time).ok()
}

fn to_arrival(service: &TrainService, seconds: i64) -> Arrival {
    let destination = service
        .destination
        .last()
        .map(|d| d.location_name.as_str())
        .unwrap_or(UNKNOWN_DESTINATION);

    Arrival::new(display_key(&service.service_id_url_safe), destination, seconds)
}

fn station_label(location_name: &str, platform: &str) -> String {
    let base = location_name
        .strip_suffix(STATION_SUFFIX)
        .unwrap_or(location_name)
        .trim();
    let platform = sanitize_platform(platform);

    if platform.is_empty() {
        base.to_string()
    } else {
        format!("{base}: Platform {platform}")
    }
}

//! Which source to show and how to filter it.
//!
//! Settings are owned by the front-end and handed to the adapters through a
//! [`SettingsStore`]. Adapters take one snapshot at the start of each query,
//! so a change made while a request is in flight applies to the next query.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const TFL_STOP_DEFAULT: &str = "910GSHRDHST";
pub const GTFS_REALTIME_DEFAULT: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-ace";
pub const GTFS_SCHEDULE_DEFAULT: &str =
    "http://web.mta.info/developers/data/nyct/subway/google_transit.zip";
pub const GTFS_STOP_DEFAULT: &str = "A42N";
pub const DARWIN_CRS_DEFAULT: &str = "PMR";

/// Errors reading settings from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// The source answering `latest()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Tfl,
    #[default]
    Gtfs,
    Darwin,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tfl => "tfl",
            Mode::Gtfs => "gtfs",
            Mode::Darwin => "darwin",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfl" => Ok(Mode::Tfl),
            "gtfs" => Ok(Mode::Gtfs),
            "darwin" => Ok(Mode::Darwin),
            _ => Err(()),
        }
    }
}

/// TfL direction filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// No filtering.
    #[default]
    All,
    Inbound,
    Outbound,
}

impl Direction {
    /// The value TfL uses in an arrival's `direction` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::All => "all",
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    /// Title-cased name for station labels.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::All => "All",
            Direction::Inbound => "Inbound",
            Direction::Outbound => "Outbound",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Direction::All),
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            _ => Err(()),
        }
    }
}

/// TfL stop and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TflSettings {
    /// NaPTAN stop id.
    pub stop_id: String,
    /// Platform filter; empty for none.
    pub platform: String,
    pub direction: Direction,
}

impl Default for TflSettings {
    fn default() -> Self {
        Self {
            stop_id: TFL_STOP_DEFAULT.to_string(),
            platform: String::new(),
            direction: Direction::All,
        }
    }
}

/// GTFS feed locations and stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GtfsSettings {
    /// GTFS-realtime protobuf feed URL.
    pub realtime_url: String,
    /// Static schedule zip URL, used for stop names.
    pub schedule_url: String,
    pub stop_id: String,
}

impl Default for GtfsSettings {
    fn default() -> Self {
        Self {
            realtime_url: GTFS_REALTIME_DEFAULT.to_string(),
            schedule_url: GTFS_SCHEDULE_DEFAULT.to_string(),
            stop_id: GTFS_STOP_DEFAULT.to_string(),
        }
    }
}

/// National Rail station and platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarwinSettings {
    /// Station CRS code.
    pub crs: String,
    /// Platform filter; empty for none.
    pub platform: String,
}

impl Default for DarwinSettings {
    fn default() -> Self {
        Self {
            crs: DARWIN_CRS_DEFAULT.to_string(),
            platform: String::new(),
        }
    }
}

/// Everything the adapters read on each query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub tfl: TflSettings,
    pub gtfs: GtfsSettings,
    pub darwin: DarwinSettings,
}

impl Settings {
    /// Defaults overridden by any `ARRIVALS_MODE`, `TFL_*`, `GTFS_*` or
    /// `DARWIN_*` environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Settings::default();

        if let Some(value) = lookup("ARRIVALS_MODE") {
            settings.mode = value.parse().map_err(|_| SettingsError::InvalidValue {
                key: "ARRIVALS_MODE",
                value,
            })?;
        }

        if let Some(value) = lookup("TFL_STOP") {
            settings.tfl.stop_id = value.trim().to_string();
        }
        if let Some(value) = lookup("TFL_PLATFORM") {
            settings.tfl.platform = value.trim().to_string();
        }
        if let Some(value) = lookup("TFL_DIRECTION") {
            settings.tfl.direction = value.parse().map_err(|_| SettingsError::InvalidValue {
                key: "TFL_DIRECTION",
                value,
            })?;
        }

        if let Some(value) = lookup("GTFS_REALTIME") {
            settings.gtfs.realtime_url = value.trim().to_string();
        }
        if let Some(value) = lookup("GTFS_SCHEDULE") {
            settings.gtfs.schedule_url = value.trim().to_string();
        }
        if let Some(value) = lookup("GTFS_STOP") {
            settings.gtfs.stop_id = value.trim().to_string();
        }

        if let Some(value) = lookup("DARWIN_CRS") {
            settings.darwin.crs = value.trim().to_string();
        }
        if let Some(value) = lookup("DARWIN_PLATFORM") {
            settings.darwin.platform = value.trim().to_string();
        }

        Ok(settings)
    }
}

/// Shared, synchronised settings.
///
/// Cloning is cheap and every clone sees the same settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    pub async fn snapshot(&self) -> Settings {
        self.inner.read().await.clone()
    }

    /// Apply a change under the write lock.
    pub async fn update(&self, change: impl FnOnce(&mut Settings)) {
        let mut guard = self.inner.write().await;
        change(&mut guard);
    }

    pub async fn mode(&self) -> Mode {
        self.inner.read().await.mode
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.mode, Mode::Gtfs);
        assert_eq!(settings.tfl.stop_id, TFL_STOP_DEFAULT);
        assert_eq!(settings.tfl.platform, "");
        assert_eq!(settings.tfl.direction, Direction::All);
        assert_eq!(settings.gtfs.stop_id, GTFS_STOP_DEFAULT);
        assert_eq!(settings.darwin.crs, DARWIN_CRS_DEFAULT);
        assert_eq!(settings.darwin.platform, "");
    }

    #[test]
    fn env_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("ARRIVALS_MODE", "Darwin"),
            ("DARWIN_CRS", " CLJ "),
            ("DARWIN_PLATFORM", "5"),
            ("TFL_DIRECTION", "inbound"),
        ]))
        .unwrap();

        assert_eq!(settings.mode, Mode::Darwin);
        assert_eq!(settings.darwin.crs, "CLJ");
        assert_eq!(settings.darwin.platform, "5");
        assert_eq!(settings.tfl.direction, Direction::Inbound);
        assert_eq!(settings.tfl.stop_id, TFL_STOP_DEFAULT);
    }

    #[test]
    fn invalid_mode_rejected() {
        let err = Settings::from_lookup(lookup(&[("ARRIVALS_MODE", "bus")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidValue {
                key: "ARRIVALS_MODE",
                value: "bus".to_string()
            }
        );
    }

    #[test]
    fn invalid_direction_rejected() {
        assert!(Settings::from_lookup(lookup(&[("TFL_DIRECTION", "sideways")])).is_err());
    }

    #[test]
    fn deserialize_partial_settings() {
        let json = r#"{"mode": "tfl", "tfl": {"platform": "2"}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.mode, Mode::Tfl);
        assert_eq!(settings.tfl.platform, "2");
        assert_eq!(settings.tfl.stop_id, TFL_STOP_DEFAULT);
        assert_eq!(settings.gtfs, GtfsSettings::default());
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::Inbound.label(), "Inbound");
        assert_eq!(Direction::Outbound.as_str(), "outbound");
    }

    #[tokio::test]
    async fn store_updates_are_shared() {
        let store = SettingsStore::new(Settings::default());
        let other = store.clone();

        other
            .update(|s| {
                s.mode = Mode::Tfl;
                s.tfl.platform = "2".to_string();
            })
            .await;

        assert_eq!(store.mode().await, Mode::Tfl);
        assert_eq!(store.snapshot().await.tfl.platform, "2");
    }

    #[tokio::test]
    async fn snapshot_is_detached() {
        let store = SettingsStore::default();
        let before = store.snapshot().await;

        store.update(|s| s.darwin.crs = "CLJ".to_string()).await;

        assert_eq!(before.darwin.crs, DARWIN_CRS_DEFAULT);
        assert_eq!(store.snapshot().await.darwin.crs, "CLJ");
    }
}

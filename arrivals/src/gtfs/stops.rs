//! Stop names from a static GTFS schedule.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Deserialize;
use tracing::debug;
use zip::ZipArchive;

use crate::domain::StopResult;

use super::error::GtfsError;

/// The schedule file holding stop names.
pub const STOPS_FILE: &str = "stops.txt";

/// Schedules change rarely; a day is fresh enough.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How long a failed schedule load is remembered before trying again.
const DEFAULT_FAILURE_TTL: Duration = Duration::from_secs(5 * 60);

/// `location_type` of a parent station grouping several platforms.
const LOCATION_TYPE_STATION: u8 = 1;

/// One row of stops.txt. Other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GtfsStop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: String,
    #[serde(default)]
    pub location_type: Option<u8>,
    #[serde(default)]
    pub parent_station: Option<String>,
}

/// Stop id → stop lookup for one schedule.
#[derive(Debug, Clone, Default)]
pub struct StopDirectory {
    stops: Vec<GtfsStop>,
    index: HashMap<String, usize>,
}

impl StopDirectory {
    /// Parse stops.txt content.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let stops = reader.deserialize().collect::<Result<Vec<GtfsStop>, _>>()?;
        Ok(Self::from_stops(stops))
    }

    /// Parse a stops.txt file.
    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    fn from_stops(stops: Vec<GtfsStop>) -> Self {
        let index = stops
            .iter()
            .enumerate()
            .map(|(i, stop)| (stop.stop_id.clone(), i))
            .collect();
        Self { stops, index }
    }

    pub fn get(&self, stop_id: &str) -> Option<&GtfsStop> {
        self.index.get(stop_id).map(|&i| &self.stops[i])
    }

    /// The stop's name, or the id itself if the stop is unknown.
    pub fn name<'a>(&'a self, stop_id: &'a str) -> &'a str {
        self.get(stop_id)
            .map(|s| s.stop_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(stop_id)
    }

    /// Every stop, in file order.
    pub fn stops(&self) -> Vec<StopResult> {
        self.stops
            .iter()
            .map(|s| StopResult {
                id: s.stop_id.clone(),
                name: s.stop_name.clone(),
                is_hub: s.location_type == Some(LOCATION_TYPE_STATION),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Unpack a schedule zip into `dir` and read its stops.
///
/// The archive is extracted into a sibling staging directory which then
/// replaces `dir`, so readers never see a half-written stops.txt.
/// Blocking; run it off the async runtime.
pub fn unpack_schedule(archive: &[u8], dir: &Path) -> Result<StopDirectory, GtfsError> {
    let parent = dir.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".unpack-")
        .tempdir_in(parent)?;
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    archive.extract(staging.path())?;
    let directory = StopDirectory::from_path(&staging.path().join(STOPS_FILE))?;

    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    std::fs::rename(staging.path(), dir)?;

    Ok(directory)
}

/// Read a previously unpacked stops.txt under `dir`.
///
/// `None` when there is no file, it is older than `max_age`, or it does
/// not parse; the caller downloads the schedule again.
/// Blocking; run it off the async runtime.
pub fn read_unpacked(dir: &Path, max_age: Duration) -> Result<Option<StopDirectory>, GtfsError> {
    let path = dir.join(STOPS_FILE);
    let modified = match std::fs::metadata(&path) {
        Ok(metadata) => metadata.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // A timestamp in the future counts as fresh.
    let age = modified.elapsed().unwrap_or_default();
    if age >= max_age {
        debug!(path = %path.display(), age_secs = age.as_secs(), "Unpacked stops are stale");
        return Ok(None);
    }

    match StopDirectory::from_path(&path) {
        Ok(directory) => Ok(Some(directory)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Unpacked stops unreadable");
            Ok(None)
        }
    }
}

/// Configuration for the stop directory cache.
#[derive(Debug, Clone)]
pub struct StopCacheConfig {
    /// How long a loaded directory is reused, in memory and on disk.
    pub ttl: Duration,
    /// How long a failed load is remembered.
    pub failure_ttl: Duration,
    /// Maximum number of schedules held.
    pub max_capacity: u64,
}

impl Default for StopCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            failure_ttl: DEFAULT_FAILURE_TTL,
            max_capacity: 8,
        }
    }
}

/// Loaded stop directories, keyed by schedule URL.
///
/// Concurrent loads of one URL share a single load. A failure is kept for
/// `failure_ttl` so polling does not retry the download every time.
#[derive(Clone)]
pub struct StopCache {
    directories: MokaCache<String, Arc<StopDirectory>>,
    failures: MokaCache<String, Arc<GtfsError>>,
    ttl: Duration,
}

impl StopCache {
    pub fn new(config: &StopCacheConfig) -> Self {
        let directories = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let failures = MokaCache::builder()
            .time_to_live(config.failure_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            directories,
            failures,
            ttl: config.ttl,
        }
    }

    /// How long a directory stays fresh.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, schedule_url: &str) -> Option<Arc<StopDirectory>> {
        self.directories.get(schedule_url).await
    }

    /// The cached directory, or the result of `load`.
    ///
    /// A recent failure for the URL is returned without running `load`.
    pub async fn get_or_load<F>(
        &self,
        schedule_url: &str,
        load: F,
    ) -> Result<Arc<StopDirectory>, Arc<GtfsError>>
    where
        F: Future<Output = Result<Arc<StopDirectory>, GtfsError>>,
    {
        if let Some(error) = self.failures.get(schedule_url).await {
            return Err(error);
        }

        let result = self
            .directories
            .try_get_with(schedule_url.to_string(), load)
            .await;
        if let Err(error) = &result {
            self.failures
                .insert(schedule_url.to_string(), error.clone())
                .await;
        }
        result
    }

    /// Drop a remembered failure so the next load tries again.
    pub async fn forget_failure(&self, schedule_url: &str) {
        self.failures.invalidate(schedule_url).await;
    }
}

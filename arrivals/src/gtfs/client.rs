//! GTFS realtime feed and static schedule client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gtfs_realtime::FeedMessage;
use prost::Message;
use tracing::debug;

use crate::http::{REQUEST_TIMEOUT, build_client};

use super::error::GtfsError;
use super::stops::{StopDirectory, read_unpacked, unpack_schedule};

/// Configuration for the GTFS client.
#[derive(Debug, Clone)]
pub struct GtfsConfig {
    /// Where schedule archives are unpacked
    pub data_dir: PathBuf,
    /// Request timeout
    pub timeout: Duration,
}

impl GtfsConfig {
    /// Create a new config unpacking schedules under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GtfsConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("arrivals").join("gtfs"))
    }
}

/// GTFS client. Feeds need no credential.
#[derive(Debug, Clone)]
pub struct GtfsClient {
    http: reqwest::Client,
    data_dir: PathBuf,
}

impl GtfsClient {
    pub fn new(config: GtfsConfig) -> Result<Self, GtfsError> {
        let http = build_client(config.timeout)?;

        Ok(Self {
            http,
            data_dir: config.data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Fetch and decode a GTFS-realtime protobuf feed.
    pub async fn fetch_feed(&self, url: &str) -> Result<FeedMessage, GtfsError> {
        let bytes = self.get_bytes(url).await?;
        let feed = FeedMessage::decode(bytes.as_ref())?;

        debug!(url, entities = feed.entity.len(), "GTFS feed decoded");
        Ok(feed)
    }

    /// Download a schedule zip, unpack it into `dir` and read stops.txt.
    pub async fn download_stops(&self, url: &str, dir: &Path) -> Result<StopDirectory, GtfsError> {
        let bytes = self.get_bytes(url).await?;
        let dir = dir.to_path_buf();

        let directory =
            tokio::task::spawn_blocking(move || unpack_schedule(&bytes, &dir)).await??;

        debug!(url, stops = directory.len(), "GTFS schedule unpacked");
        Ok(directory)
    }

    /// Stops already unpacked in `dir`, if younger than `max_age`.
    pub async fn unpacked_stops(
        &self,
        dir: &Path,
        max_age: Duration,
    ) -> Result<Option<StopDirectory>, GtfsError> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || read_unpacked(&dir, max_age)).await?
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, GtfsError> {
        debug!(url, "GTFS request");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(GtfsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

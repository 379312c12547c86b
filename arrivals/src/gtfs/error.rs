//! GTFS error types.

use crate::domain::NoDataError;

/// Errors fetching or reading GTFS data.
#[derive(Debug, thiserror::Error)]
pub enum GtfsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status code
    #[error("feed error {status}: {url}")]
    Status { status: u16, url: String },

    /// Realtime feed was not a valid protobuf message
    #[error("feed decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Schedule archive could not be opened or unpacked
    #[error("schedule archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("schedule file error: {0}")]
    Io(#[from] std::io::Error),

    /// stops.txt could not be parsed
    #[error("stops.txt error: {0}")]
    Csv(#[from] csv::Error),

    #[error("schedule unpack task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<GtfsError> for NoDataError {
    fn from(err: GtfsError) -> Self {
        NoDataError::new(err.to_string())
    }
}

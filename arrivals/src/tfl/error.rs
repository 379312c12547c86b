//! TfL client error types.

use crate::domain::NoDataError;
use crate::http::InvalidBaseUrl;

/// Errors from the TfL Unified API client.
#[derive(Debug, thiserror::Error)]
pub enum TflError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL is unusable
    #[error(transparent)]
    BaseUrl(#[from] InvalidBaseUrl),

    /// The app key was rejected
    #[error("unauthorized (status {status}): check TFL_APP_KEY")]
    Unauthorized { status: u16 },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl From<TflError> for NoDataError {
    fn from(err: TflError) -> Self {
        match err {
            TflError::Unauthorized { .. } => NoDataError::new("TfL API app key error"),
            TflError::Http(_) | TflError::BaseUrl(_) | TflError::Api { .. } => {
                NoDataError::new("Can't connect to TfL API")
            }
            TflError::Json { .. } => NoDataError::new("No connection"),
        }
    }
}

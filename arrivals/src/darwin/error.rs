//! Darwin client error types.

use crate::domain::{InvalidCrs, NoDataError};
use crate::http::InvalidBaseUrl;

/// Errors from the Darwin HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum DarwinError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL is unusable
    #[error(transparent)]
    BaseUrl(#[from] InvalidBaseUrl),

    /// The access token was rejected
    #[error("unauthorized (status {status}): check DARWIN_ACCESS_TOKEN")]
    Unauthorized { status: u16 },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The configured station code is not a CRS code
    #[error(transparent)]
    InvalidCrs(#[from] InvalidCrs),
}

impl From<DarwinError> for NoDataError {
    fn from(err: DarwinError) -> Self {
        match err {
            DarwinError::Unauthorized { .. } => NoDataError::new("Darwin access token error"),
            DarwinError::Http(_) | DarwinError::BaseUrl(_) | DarwinError::ApiError { .. } => {
                NoDataError::new("Can't connect to Darwin API")
            }
            DarwinError::Json { .. } => NoDataError::new("No connection"),
            DarwinError::InvalidCrs(e) => NoDataError::new(format!("Station code error: {e}")),
        }
    }
}

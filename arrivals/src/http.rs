//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::Url;

/// Every upstream request gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the client used by all three sources.
///
/// A timeout surfaces as an ordinary `reqwest::Error`, which each source
/// reports as a connectivity failure.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// A configured base URL that cannot take a path.
#[derive(Debug, thiserror::Error)]
#[error("invalid base URL: {0}")]
pub struct InvalidBaseUrl(pub String);

/// Parse a base URL that endpoint paths are appended to.
pub fn parse_base_url(base: &str) -> Result<Url, InvalidBaseUrl> {
    match Url::parse(base) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url),
        _ => Err(InvalidBaseUrl(base.to_string())),
    }
}

/// `base` with each of `segments` appended as one percent-encoded path
/// segment, so user input cannot add path levels, a query or a fragment.
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

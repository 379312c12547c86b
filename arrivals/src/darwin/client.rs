//! Darwin departure board HTTP client.
//!
//! Talks to the Huxley2 JSON proxy in front of the National Rail Darwin
//! LDB service. The access token travels as a query parameter on every
//! request.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::Crs;
use crate::http::{REQUEST_TIMEOUT, build_client, endpoint, parse_base_url};

use super::error::DarwinError;
use super::types::{DepartureBoard, StationSearchResult};

/// Default base URL for the Huxley2 proxy.
const DEFAULT_BASE_URL: &str = "https://huxley2.azurewebsites.net";

/// Rows requested per board. Filtering happens locally, so ask for more
/// than are shown.
pub const DEFAULT_NUM_ROWS: u8 = 20;

/// Configuration for the Darwin client.
#[derive(Debug, Clone)]
pub struct DarwinConfig {
    /// Darwin access token
    pub access_token: String,
    /// Base URL for the API (defaults to the public Huxley2 proxy)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl DarwinConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Darwin departure board client.
#[derive(Debug, Clone)]
pub struct DarwinClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl DarwinClient {
    /// Create a new Darwin client with the given configuration.
    pub fn new(config: DarwinConfig) -> Result<Self, DarwinError> {
        let http = build_client(config.timeout)?;

        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            access_token: config.access_token,
        })
    }

    /// Get the departure board for a station.
    pub async fn get_departures(
        &self,
        crs: &Crs,
        num_rows: u8,
    ) -> Result<DepartureBoard, DarwinError> {
        let rows = num_rows.to_string();
        let url = endpoint(&self.base_url, &["departures", crs.as_str(), &rows]);
        self.request(url, &[("expand", "false")]).await
    }

    /// Search stations by name or code.
    pub async fn search_crs(&self, query: &str) -> Result<Vec<StationSearchResult>, DarwinError> {
        let url = endpoint(&self.base_url, &["crs", query.trim()]);
        self.request(url, &[]).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, DarwinError> {
        debug!(url = %url, "Darwin request");

        let response = self
            .http
            .get(url)
            .query(&[("accessToken", self.access_token.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::BAD_REQUEST
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return Err(DarwinError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DarwinError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| DarwinError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubServer, closed_port_url};

    const BOARD: &str = r#"{
        "generatedAt": "2025-11-25T10:00:00+00:00",
        "locationName": "Peckham Rye",
        "crs": "PMR",
        "trainServices": []
    }"#;

    fn client(base_url: &str) -> DarwinClient {
        DarwinClient::new(DarwinConfig::new("token-123").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn config_builder() {
        let config = DarwinConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.access_token, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn config_defaults() {
        let config = DarwinConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn requests_board_with_token() {
        let mut server = StubServer::start(200, BOARD).await;
        let crs = Crs::parse("PMR").unwrap();

        let board = client(&server.base_url)
            .get_departures(&crs, DEFAULT_NUM_ROWS)
            .await
            .unwrap();

        assert_eq!(board.location_name, "Peckham Rye");
        let request = server.next_request().await;
        assert!(request.starts_with("GET /departures/PMR/20?"));
        assert!(request.contains("accessToken=token-123"));
        assert!(request.contains("expand=false"));
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        for status in [400, 401, 403] {
            let server = StubServer::start(status, "").await;
            let crs = Crs::parse("PMR").unwrap();

            let err = client(&server.base_url)
                .get_departures(&crs, DEFAULT_NUM_ROWS)
                .await
                .unwrap_err();

            assert!(matches!(err, DarwinError::Unauthorized { status: s } if s == status));
        }
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = StubServer::start(503, "busy").await;
        let crs = Crs::parse("PMR").unwrap();

        let err = client(&server.base_url)
            .get_departures(&crs, DEFAULT_NUM_ROWS)
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let server = StubServer::start(200, "<html>").await;
        let crs = Crs::parse("PMR").unwrap();

        let err = client(&server.base_url)
            .get_departures(&crs, DEFAULT_NUM_ROWS)
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::Json { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let base_url = closed_port_url().await;
        let crs = Crs::parse("PMR").unwrap();

        let err = client(&base_url)
            .get_departures(&crs, DEFAULT_NUM_ROWS)
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::Http(_)));
    }

    #[tokio::test]
    async fn search_crs() {
        let mut server = StubServer::start(
            200,
            r#"[{"crsCode": "CLJ", "stationName": "Clapham Junction"}]"#,
        )
        .await;

        let results = client(&server.base_url).search_crs("clapham").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].crs_code, "CLJ");
        assert!(server.next_request().await.starts_with("GET /crs/clapham?"));
    }

    #[tokio::test]
    async fn search_query_is_encoded() {
        let mut server = StubServer::start(200, "[]").await;

        let results = client(&server.base_url)
            .search_crs("King's Cross/St Pancras?")
            .await
            .unwrap();

        assert!(results.is_empty());
        let request = server.next_request().await;
        assert!(request.starts_with("GET /crs/King's%20Cross%2FSt%20Pancras%3F?accessToken="));
    }
}

//! TfL Unified API client.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{REQUEST_TIMEOUT, build_client, endpoint, parse_base_url};

use super::error::TflError;
use super::types::{ApiArrival, ApiSearchResult, ApiStopPoint};

/// Default base URL for the Unified API.
const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Modes offered by stop search. Buses are left out.
const SEARCH_MODES: &str = "dlr,elizabeth-line,overground,tube,tram";

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    /// Unified API app key
    pub app_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl TflConfig {
    /// Create a new config with the given app key.
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
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

/// TfL Unified API client.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: Url,
    app_key: String,
}

impl TflClient {
    /// Create a new TfL client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, TflError> {
        let http = build_client(config.timeout)?;

        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            app_key: config.app_key,
        })
    }

    /// Live predictions for a stop.
    ///
    /// Terminal stations answer with an empty or non-JSON body, which is
    /// treated as no predictions.
    pub async fn fetch_arrivals(&self, stop_id: &str) -> Result<Vec<ApiArrival>, TflError> {
        let url = endpoint(&self.base_url, &["StopPoint", stop_id.trim(), "Arrivals"]);

        match self.request(url, &[]).await {
            Err(TflError::Json { message }) => {
                debug!(stop_id, message = %message, "Unreadable arrivals body, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Search rail and metro stops by name.
    pub async fn search_stations(&self, query: &str) -> Result<ApiSearchResult, TflError> {
        let url = endpoint(&self.base_url, &["StopPoint", "Search"]);
        let params = [
            ("query", query.trim()),
            ("modes", SEARCH_MODES),
            ("tflOperatedNationalRailStationsOnly", "true"),
        ];
        self.request(url, &params).await
    }

    /// A stop point and its children.
    pub async fn stop_details(&self, id: &str) -> Result<ApiStopPoint, TflError> {
        let url = endpoint(&self.base_url, &["StopPoint", id.trim()]);
        self.request(url, &[]).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, TflError> {
        debug!(url = %url, "TfL request");

        let response = self
            .http
            .get(url)
            .query(&[("app_key", self.app_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TflError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TflError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TflError::Json {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubServer, closed_port_url};

    fn client(base_url: &str) -> TflClient {
        TflClient::new(TflConfig::new("key-123").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn config_builder() {
        let config = TflConfig::new("key")
            .with_base_url("http://localhost:8080/")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.app_key, "key");
        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(3));

        assert_eq!(TflConfig::new("key").base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn fetches_arrivals_with_app_key() {
        let mut server = StubServer::start(
            200,
            r#"[{"id": "1", "stationName": "Bank", "platformName": "Platform 1",
                 "direction": "inbound", "destinationName": "Stratford", "timeToStation": 90}]"#,
        )
        .await;

        let arrivals = client(&format!("{}/", server.base_url))
            .fetch_arrivals("940GZZLUBNK")
            .await
            .unwrap();

        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].destination_name, "Stratford");
        let request = server.next_request().await;
        assert!(request.starts_with("GET /StopPoint/940GZZLUBNK/Arrivals?"));
        assert!(request.contains("app_key=key-123"));
    }

    #[tokio::test]
    async fn empty_arrivals_body_is_no_arrivals() {
        for body in ["", "<html>", "{}"] {
            let server = StubServer::start(200, body).await;

            let arrivals = client(&server.base_url)
                .fetch_arrivals("910GSHRDHST")
                .await
                .unwrap();

            assert!(arrivals.is_empty());
        }
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        for status in [401, 403] {
            let server = StubServer::start(status, "").await;

            let err = client(&server.base_url)
                .fetch_arrivals("910GSHRDHST")
                .await
                .unwrap_err();

            assert!(matches!(err, TflError::Unauthorized { status: s } if s == status));
        }
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = StubServer::start(500, "oops").await;

        let err = client(&server.base_url)
            .stop_details("HUBCAW")
            .await
            .unwrap_err();

        assert!(matches!(err, TflError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let err = client(&closed_port_url().await)
            .fetch_arrivals("910GSHRDHST")
            .await
            .unwrap_err();

        assert!(matches!(err, TflError::Http(_)));
    }

    #[tokio::test]
    async fn search_sends_mode_filters() {
        let mut server = StubServer::start(200, r#"{"matches": []}"#).await;

        let result = client(&server.base_url).search_stations("bank").await.unwrap();

        assert!(result.matches.is_empty());
        let request = server.next_request().await;
        assert!(request.starts_with("GET /StopPoint/Search?"));
        assert!(request.contains("query=bank"));
        assert!(request.contains("modes=dlr%2Celizabeth-line%2Coverground%2Ctube%2Ctram"));
        assert!(request.contains("tflOperatedNationalRailStationsOnly=true"));
    }

    #[tokio::test]
    async fn malformed_stop_details_is_json_error() {
        let server = StubServer::start(200, "[]").await;

        let err = client(&server.base_url)
            .stop_details("HUBCAW")
            .await
            .unwrap_err();

        assert!(matches!(err, TflError::Json { .. }));
    }

    #[tokio::test]
    async fn stop_id_stays_one_path_segment() {
        let mut server = StubServer::start(200, "[]").await;

        client(&server.base_url)
            .fetch_arrivals("940G/../Search?x#y")
            .await
            .unwrap();

        let request = server.next_request().await;
        assert!(request.starts_with("GET /StopPoint/940G%2F..%2FSearch%3Fx%23y/Arrivals?app_key="));
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let err = TflClient::new(TflConfig::new("key").with_base_url("api.tfl.gov.uk")).unwrap_err();

        assert!(matches!(err, TflError::BaseUrl(_)));
    }
}

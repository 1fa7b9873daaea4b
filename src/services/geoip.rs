use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Coordinate;

/// Errors that can occur during an IP geolocation lookup
#[derive(Debug, Error)]
pub enum GeoIpError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("lookup failed: {0}")]
    LookupFailed(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Response shape of the lookup endpoint
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// IP geolocation client
///
/// Resolves a client address to an approximate coordinate when the request
/// carries no explicit viewer position. Lookups are best-effort: handlers
/// fall back to the configured default location on any failure.
pub struct GeoIpClient {
    base_url: String,
    client: Client,
}

impl GeoIpClient {
    /// Create a new client for the given lookup endpoint
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// Look up the approximate coordinate of an IP address
    pub async fn locate(&self, ip: &str) -> Result<Coordinate, GeoIpError> {
        let url = format!(
            "{}/json/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ip)
        );

        tracing::debug!("GeoIP lookup: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeoIpError::LookupFailed(format!(
                "lookup endpoint returned {}",
                response.status()
            )));
        }

        let body: LookupResponse = response.json().await?;

        if let Some(status) = &body.status {
            if status != "success" {
                return Err(GeoIpError::LookupFailed(
                    body.message
                        .unwrap_or_else(|| format!("status {}", status)),
                ));
            }
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(GeoIpError::InvalidResponse(
                "missing lat/lon fields".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locate_parses_coordinates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/json/203.0.113.7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","lat":29.0586624,"lon":31.1263232}"#)
            .create_async()
            .await;

        let client = GeoIpClient::new(server.url());
        let coordinate = client.locate("203.0.113.7").await.unwrap();

        assert!((coordinate.latitude - 29.0586624).abs() < 1e-9);
        assert!((coordinate.longitude - 31.1263232).abs() < 1e-9);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_locate_surfaces_api_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/json/10.0.0.1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"fail","message":"private range"}"#)
            .create_async()
            .await;

        let client = GeoIpClient::new(server.url());
        let result = client.locate("10.0.0.1").await;

        match result {
            Err(GeoIpError::LookupFailed(message)) => assert!(message.contains("private range")),
            other => panic!("expected LookupFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_locate_rejects_missing_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/json/203.0.113.8")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = GeoIpClient::new(server.url());
        let result = client.locate("203.0.113.8").await;
        assert!(matches!(result, Err(GeoIpError::InvalidResponse(_))));
    }
}

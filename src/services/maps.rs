use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when resolving distances
#[derive(Debug, Error)]
pub enum MapsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// External distance lookup: address pair to driving distance
///
/// `Ok(None)` means the distance is not available for this pair (no API key
/// configured, or the route could not be resolved); callers leave the field
/// unknown rather than guessing.
#[async_trait]
pub trait DistanceLookup: Send + Sync {
    async fn distance_km(&self, origin: &str, destination: &str) -> Result<Option<f64>, MapsError>;
}

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Google Maps Distance Matrix client
pub struct GoogleMapsClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl GoogleMapsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl DistanceLookup for GoogleMapsClient {
    async fn distance_km(&self, origin: &str, destination: &str) -> Result<Option<f64>, MapsError> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let url = format!(
            "{}/maps/api/distancematrix/json",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("mode", "driving"),
                ("units", "metric"),
                ("key", api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MapsError::ApiError(format!(
                "Distance lookup failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let status = json.get("status").and_then(|s| s.as_str()).unwrap_or("");
        if status != "OK" {
            return Err(MapsError::ApiError(format!(
                "Distance Matrix status: {}",
                status
            )));
        }

        let element = json
            .get("rows")
            .and_then(|rows| rows.get(0))
            .and_then(|row| row.get("elements"))
            .and_then(|elements| elements.get(0))
            .ok_or_else(|| MapsError::InvalidResponse("Missing rows/elements".into()))?;

        // Element-level NOT_FOUND / ZERO_RESULTS just means no distance for
        // this pair, not a failed lookup.
        if element.get("status").and_then(|s| s.as_str()) != Some("OK") {
            return Ok(None);
        }

        let meters = element
            .get("distance")
            .and_then(|d| d.get("value"))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| MapsError::InvalidResponse("Missing distance value".into()))?;

        Ok(Some((meters / 1000.0 * 10.0).round() / 10.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_api_key_means_unavailable() {
        let client = GoogleMapsClient::new(None);
        let result = client.distance_km("Zermatt", "Hotel Alpenblick").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_parses_distance_from_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/maps/api/distancematrix/json")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                    "status": "OK",
                    "rows": [{"elements": [{
                        "status": "OK",
                        "distance": {"value": 5230, "text": "5.2 km"},
                        "duration": {"value": 480, "text": "8 mins"}
                    }]}]
                }"#,
            )
            .create_async()
            .await;

        let client =
            GoogleMapsClient::with_base_url(Some("test_key".to_string()), server.url());
        let distance = client
            .distance_km("Leukerbad, Switzerland", "Hotel XYZ, Leukerbad")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(distance, Some(5.2));
    }

    #[tokio::test]
    async fn test_element_not_found_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/maps/api/distancematrix/json")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": "OK", "rows": [{"elements": [{"status": "NOT_FOUND"}]}]}"#)
            .create_async()
            .await;

        let client =
            GoogleMapsClient::with_base_url(Some("test_key".to_string()), server.url());
        let distance = client.distance_km("Nowhere", "Elsewhere").await.unwrap();
        assert_eq!(distance, None);
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/maps/api/distancematrix/json")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": "REQUEST_DENIED"}"#)
            .create_async()
            .await;

        let client =
            GoogleMapsClient::with_base_url(Some("bad_key".to_string()), server.url());
        let result = client.distance_km("A", "B").await;
        assert!(matches!(result, Err(MapsError::ApiError(_))));
    }
}

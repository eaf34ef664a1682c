//! HTTP geocoder client.
//!
//! Talks to a JSON geocoding service exposing `/search`, `/geocode` and
//! `/reverse`. Transport errors, error statuses and unparseable bodies are
//! logged and reported as "no result", never as errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::metrics::{EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS};

use super::parse::{parse_geocoded, parse_reverse, parse_suggestions};
use super::{
    AddressMeta, AddressSuggestion, GeocodeTarget, GeocodedAddress, GeocodingError,
    GeocodingProvider,
};

/// HTTP geocoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpGeocoderConfig {
    /// Service base URL (e.g., "https://geocoder.example.com/api").
    pub base_url: String,
    /// API key, sent as the `api_key` query parameter when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    10
}

/// HTTP geocoder client.
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGeocoder {
    /// Create a new HTTP geocoder.
    pub fn new(config: HttpGeocoderConfig) -> Result<Self, GeocodingError> {
        if config.base_url.trim().is_empty() {
            return Err(GeocodingError::NotConfigured(
                "geocoder base_url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.is_empty()),
        })
    }

    /// GET `path` and decode the body as JSON; `None` on any upstream failure.
    async fn fetch_json(&self, path: &str, query: &[(&str, String)]) -> Option<Value> {
        let start = Instant::now();
        let body = self.request_json(path, query).await;

        let status = if body.is_some() { "success" } else { "error" };
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["geocoder", path, status])
            .inc();
        EXTERNAL_SERVICE_DURATION
            .with_label_values(&["geocoder", path])
            .observe(start.elapsed().as_secs_f64());
        body
    }

    async fn request_json(&self, path: &str, query: &[(&str, String)]) -> Option<Value> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key)]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(path, error = %e, "Geocoder request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Geocoder returned error status");
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(path, error = %e, "Failed to decode geocoder response");
                None
            }
        }
    }
}

#[async_trait]
impl GeocodingProvider for HttpGeocoder {
    async fn get_candidates(&self, text: &str) -> Result<Vec<AddressSuggestion>, GeocodingError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query = text, "Geocoder candidate search");
        let candidates = self
            .fetch_json("search", &[("q", text.to_string())])
            .await
            .map(|body| parse_suggestions(&body))
            .unwrap_or_default();
        Ok(candidates)
    }

    async fn geocode_address(
        &self,
        target: &GeocodeTarget,
    ) -> Result<Option<GeocodedAddress>, GeocodingError> {
        let param = match target {
            GeocodeTarget::Text(text) if !text.trim().is_empty() => ("q", text.trim().to_string()),
            GeocodeTarget::Id(id) if !id.trim().is_empty() => ("id", id.trim().to_string()),
            _ => return Ok(None),
        };

        debug!(?target, "Geocoding address");
        Ok(self
            .fetch_json("geocode", &[param])
            .await
            .and_then(|body| parse_geocoded(&body)))
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<AddressMeta>, GeocodingError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Ok(None);
        }

        debug!(latitude, longitude, "Reverse geocoding");
        Ok(self
            .fetch_json(
                "reverse",
                &[("lat", latitude.to_string()), ("lng", longitude.to_string())],
            )
            .await
            .and_then(|body| parse_reverse(&body)))
    }
}

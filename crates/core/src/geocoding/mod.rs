//! Address geocoding.
//!
//! [`GeocodingProvider`] is the seam to an external geocoder. The HTTP
//! implementation never fails on upstream trouble; it logs and returns an
//! empty result instead. [`LocationResolver`] adds the country gate used by
//! discovery.

mod http;
pub mod parse;
mod resolver;
mod types;

pub use http::{HttpGeocoder, HttpGeocoderConfig};
pub use resolver::LocationResolver;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when geocoding.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Provider not configured (missing base URL, etc.).
    #[error("Geocoder not configured: {0}")]
    NotConfigured(String),

    /// Provider failed in a way it could not absorb.
    #[error("Geocoder failure: {0}")]
    Provider(String),
}

/// Trait for geocoding backends.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Autocomplete candidates for partial address text.
    async fn get_candidates(&self, text: &str) -> Result<Vec<AddressSuggestion>, GeocodingError>;

    /// Geocode free text or a previously returned candidate id.
    async fn geocode_address(
        &self,
        target: &GeocodeTarget,
    ) -> Result<Option<GeocodedAddress>, GeocodingError>;

    /// Describe the place at the given coordinates.
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<AddressMeta>, GeocodingError>;
}

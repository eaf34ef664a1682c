//! Country-gated address resolution.

use std::sync::Arc;

use tracing::debug;

use super::{GeoPoint, GeocodeTarget, GeocodingError, GeocodingProvider, LocationInput};

/// Turns a user-supplied address into coordinates for the supported country.
#[derive(Clone)]
pub struct LocationResolver {
    provider: Arc<dyn GeocodingProvider>,
    supported_country: String,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn GeocodingProvider>, supported_country: impl Into<String>) -> Self {
        Self {
            provider,
            supported_country: supported_country.into(),
        }
    }

    /// Resolve `input` to a point.
    ///
    /// Unsupported countries and blank addresses yield `None` without
    /// calling the provider. Provider errors propagate.
    pub async fn resolve_user_location(
        &self,
        country_code: &str,
        input: &LocationInput,
    ) -> Result<Option<GeoPoint>, GeocodingError> {
        if !country_code
            .trim()
            .eq_ignore_ascii_case(&self.supported_country)
        {
            debug!(country_code, "Country not supported for geocoding");
            return Ok(None);
        }

        let address = input.location.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let geocoded = self
            .provider
            .geocode_address(&GeocodeTarget::Text(address.to_string()))
            .await?;

        let point = geocoded.and_then(|g| GeoPoint::new(g.point.latitude(), g.point.longitude()));
        debug!(address, resolved = point.is_some(), "Location resolution complete");
        Ok(point)
    }
}
